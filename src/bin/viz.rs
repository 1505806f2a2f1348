use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use cruise_emissions::fit::{AxisScale, CurveBuilder};
use cruise_emissions::methods::{bffm2, dlr, Bffm2Config, DlrConfig};
use cruise_emissions::reference::{corrected_fuel_flow_set, presets, LtoReference};
use cruise_emissions::Result;

/// One panel: the sea-level reference curve and the corrected cruise points.
struct Panel {
    title: String,
    sea_level: Vec<[f64; 2]>,
    cruise: Vec<[f64; 2]>,
}

fn sample_curve(reference: &[LtoReference], scale: AxisScale, builder: CurveBuilder) -> Result<Vec<[f64; 2]>> {
    let curve = corrected_fuel_flow_set(reference)?.fit(builder.scale(scale))?;
    let (lo, hi) = curve.domain();
    (0..=200)
        .map(|i| {
            let x = (lo + (hi - lo) * i as f64 / 200.0).min(hi);
            Ok([x, curve.evaluate(x)?])
        })
        .collect()
}

fn build_panels() -> Result<Vec<Panel>> {
    let bffm2_config = Bffm2Config::default();
    let bffm2_ref = presets::bffm2_validation();
    let bffm2_rows = bffm2::run(&bffm2_config, &bffm2_ref, &presets::bffm2_cruise_fuel_flow())?;

    let dlr_config = DlrConfig::default();
    let dlr_ref = presets::dlr_example();
    let dlr_points = dlr::points(&[1000.0, 2000.0], &[0.5, 0.6], &[20.0, 15.0])?;
    let dlr_rows = dlr::run(&dlr_config, &dlr_ref, &dlr_points)?;

    Ok(vec![
        Panel {
            title: format!(
                "BFFM2 at {:.0} ft, Mach {:.2}",
                bffm2_config.condition.altitude_ft(),
                bffm2_config.condition.mach
            ),
            sea_level: sample_curve(
                &bffm2_ref,
                AxisScale::LogLog,
                CurveBuilder::new().method(bffm2_config.fit),
            )?,
            cruise: bffm2_rows.iter().map(|r| [r.fuel_flow_sl, r.ei_alt]).collect(),
        },
        Panel {
            title: "DLR example operating points".into(),
            sea_level: sample_curve(&dlr_ref, AxisScale::Linear, CurveBuilder::new().method(dlr_config.fit))?,
            cruise: dlr_rows.iter().map(|r| [r.fuel_flow_sl, r.ei_alt]).collect(),
        },
    ])
}

fn main() -> eframe::Result {
    let panels = match build_panels() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };

    let app = EmissionsViz { panels };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native("Cruise Emissions", options, Box::new(|_| Ok(Box::new(app))))
}

struct EmissionsViz {
    panels: Vec<Panel>,
}

impl eframe::App for EmissionsViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("EINOx: sea-level reference vs cruise");
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let w = available.x / self.panels.len().max(1) as f32 - 8.0;
            let h = available.y - 24.0;

            ui.horizontal(|ui| {
                for (i, panel) in self.panels.iter().enumerate() {
                    ui.vertical(|ui| {
                        ui.label(panel.title.as_str());
                        let sea_level: PlotPoints = panel.sea_level.iter().copied().collect();
                        let cruise: PlotPoints = panel.cruise.iter().copied().collect();
                        Plot::new(format!("panel-{i}"))
                            .width(w)
                            .height(h)
                            .x_axis_label("Sea-level fuel flow (kg/s)")
                            .y_axis_label("EINOx (g/kg)")
                            .show(ui, |plot_ui| {
                                plot_ui.line(Line::new("Sea level", sea_level));
                                plot_ui.line(Line::new("Cruise", cruise));
                            });
                    });
                }
            });
        });
    }
}
