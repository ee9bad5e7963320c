use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Ui, Vec2};
use egui_plot::{Plot, PlotImage, PlotPoint};

use lcxlc_plots::color::ColorMap;
use lcxlc_plots::engine::Reconstruction;

use crate::state::AppState;

const COLORBAR_WIDTH: f32 = 70.0;
const COLORBAR_STEPS: usize = 64;

// ---------------------------------------------------------------------------
// 2D plot (central panel, Plots tab)
// ---------------------------------------------------------------------------

/// Render the reconstructed matrix with axes, title and colour bar.
pub fn matrix_plot(ui: &mut Ui, state: &AppState, texture: Option<&egui::TextureHandle>) {
    let (Some(rec), Some(tex)) = (&state.current, texture) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.series.is_none() {
                ui.heading("Open a file to view data  (File → Open…)");
            } else {
                ui.heading("Choose a wavelength and press \"Draw plot\"");
            }
        });
        return;
    };

    if state.options.show_title {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(rec.title());
        });
    }

    let (x_min, x_max) = rec.axes.x_extent();
    let (y_min, y_max) = rec.axes.y_extent();
    let width = (x_max - x_min).max(f64::EPSILON);
    let height = (y_max - y_min).max(f64::EPSILON);

    let bar_space = if state.options.show_colorbar { COLORBAR_WIDTH } else { 0.0 };
    let plot_height = ui.available_height() - ui.spacing().interact_size.y;

    ui.horizontal(|ui: &mut Ui| {
        Plot::new("matrix_plot")
            .width(ui.available_width() - bar_space)
            .height(plot_height)
            .x_axis_label("1D time [min]")
            .y_axis_label("2D time [s]")
            .include_x(x_min)
            .include_x(x_max)
            .include_y(y_min)
            .include_y(y_max)
            .show(ui, |plot_ui| {
                plot_ui.image(PlotImage::new(
                    tex,
                    PlotPoint::new(x_min + width / 2.0, y_min + height / 2.0),
                    [width as f32, height as f32],
                ));
            });

        if state.options.show_colorbar {
            colorbar(ui, rec, state.options.colormap, plot_height);
        }
    });

    ui.label(rec.accounting.to_string());
}

/// Gradient strip with min / max labels and the scale's fixed ticks.
fn colorbar(ui: &mut Ui, rec: &Reconstruction, colormap: ColorMap, height: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(COLORBAR_WIDTH, height), Sense::hover());
    let painter = ui.painter_at(rect);
    let strip = Rect::from_min_size(
        rect.min + Vec2::new(4.0, 8.0),
        Vec2::new(18.0, (rect.height() - 16.0).max(1.0)),
    );

    let step = strip.height() / COLORBAR_STEPS as f32;
    for i in 0..COLORBAR_STEPS {
        let t = 1.0 - (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let c = colormap.sample(t);
        let band = Rect::from_min_size(
            strip.min + Vec2::new(0.0, i as f32 * step),
            Vec2::new(strip.width(), step + 0.5),
        );
        painter.rect_filled(band, 0.0, Color32::from_rgb(c.red, c.green, c.blue));
    }

    let text_color = ui.visuals().text_color();
    let font = FontId::proportional(11.0);
    let label = |value: f64| {
        let y = strip.bottom() - rec.bounds.fraction(value) as f32 * strip.height();
        painter.text(
            egui::pos2(strip.right() + 4.0, y),
            Align2::LEFT_CENTER,
            format!("{value:.2}"),
            font.clone(),
            text_color,
        );
    };

    label(rec.bounds.min);
    label(rec.bounds.max);
    for &tick in rec.ticks().unwrap_or_default() {
        if tick > rec.bounds.min && tick < rec.bounds.max {
            label(tick);
        }
    }
}
