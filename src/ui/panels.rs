use eframe::egui::{self, Color32, RichText, Ui};

use lcxlc_plots::color::ColorMap;
use lcxlc_plots::engine::IntensityScale;
use lcxlc_plots::render::PlotMode;

use super::Action;
use crate::state::{AppState, Busy, Tab};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, tab switcher and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> Option<Action> {
    let mut action = None;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                action = open_file_dialog().map(Action::Open);
                ui.close_menu();
            }
            ui.separator();
            let loaded = state.series.is_some();
            if ui
                .add_enabled(loaded, egui::Button::new("Export wavelength…"))
                .clicked()
            {
                let name = format!("{}.tsv", state.selected.as_deref().unwrap_or("wavelength"));
                action = save_tsv_dialog(&name).map(Action::ExportWavelength);
                ui.close_menu();
            }
            if ui.add_enabled(loaded, egui::Button::new("Export all…")).clicked() {
                action = save_tsv_dialog("all_wavelengths.tsv").map(Action::ExportAll);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.selectable_value(&mut state.tab, Tab::Data, "Data");
        ui.selectable_value(&mut state.tab, Tab::Plots, "Plots");
        ui.separator();

        if let Some(series) = &state.series {
            ui.label(series.to_string());
        }
        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        } else if let Some(msg) = &state.info_message {
            ui.label(msg);
        }
    });
    action
}

// ---------------------------------------------------------------------------
// Plots tab – side panel
// ---------------------------------------------------------------------------

/// Render the parameter / figure / export controls.
pub fn plot_controls(ui: &mut Ui, state: &mut AppState) -> Option<Action> {
    let mut action = None;

    let Some(series) = state.series.clone() else {
        ui.label("No data loaded.");
        return None;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Wavelength [nm]");
            let current = state.selected.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("wavelength")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for label in series.labels() {
                        if ui.selectable_label(current == label, label).clicked() {
                            state.select_wavelength(label.to_string());
                        }
                    }
                });
            ui.separator();

            // ---- Acquisition ----
            ui.strong("Parameters");
            let mut edited = false;
            egui::Grid::new("parameters").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Modulation time [min]");
                edited |= ui.text_edit_singleline(&mut state.inputs.modulation_time).lost_focus();
                ui.end_row();
                ui.label("Sample rate [Hz]");
                edited |= ui.text_edit_singleline(&mut state.inputs.sample_rate).lost_focus();
                ui.end_row();
                ui.label("Shift [s]");
                edited |= ui.text_edit_singleline(&mut state.inputs.shift_time).lost_focus();
                ui.end_row();
            });
            if edited {
                state.redraw();
            }
            ui.horizontal(|ui: &mut Ui| {
                for scale in IntensityScale::ALL {
                    ui.radio_value(&mut state.options.intensity_scale, scale, scale.to_string());
                }
            });
            ui.separator();

            // ---- Figure ----
            ui.strong("Figure");
            let before = (state.options.colormap, state.options.plot_mode);
            egui::ComboBox::from_id_salt("plot_mode")
                .selected_text(state.options.plot_mode.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for mode in PlotMode::ALL {
                        ui.selectable_value(&mut state.options.plot_mode, mode, mode.to_string());
                    }
                });
            egui::ComboBox::from_id_salt("colormap")
                .selected_text(state.options.colormap.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for map in ColorMap::ALL {
                        ui.selectable_value(&mut state.options.colormap, map, map.to_string());
                    }
                });
            if before != (state.options.colormap, state.options.plot_mode) {
                state.texture_dirty = true;
            }
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Size [in]");
                ui.add(egui::DragValue::new(&mut state.options.figure.width).range(1..=20));
                ui.label("×");
                ui.add(egui::DragValue::new(&mut state.options.figure.height).range(1..=20));
            });
            ui.checkbox(&mut state.options.show_title, "Show title");
            ui.separator();

            // ---- Colour bar ----
            ui.strong("Colour bar");
            ui.checkbox(&mut state.options.show_colorbar, "Show colour bar");
            ui.checkbox(&mut state.options.fixed_colorbar, "Set fixed");
            egui::Grid::new("colorbar").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Min");
                ui.text_edit_singleline(&mut state.inputs.bar_min);
                ui.end_row();
                ui.label("Max");
                ui.text_edit_singleline(&mut state.inputs.bar_max);
                ui.end_row();
            });
            ui.separator();

            let idle = state.busy.is_none();
            if ui.add_enabled(idle, egui::Button::new("Draw plot")).clicked() {
                let result = state.draw();
                state.report(result);
            }
            ui.separator();

            // ---- Save ----
            ui.strong("Save");
            ui.horizontal(|ui: &mut Ui| {
                let drawn = state.current.is_some();
                if ui
                    .add_enabled(idle && drawn, egui::Button::new("Current plot…"))
                    .clicked()
                {
                    let name = state
                        .current
                        .as_ref()
                        .map(|rec| format!("{}.png", rec.label))
                        .unwrap_or_default();
                    action = rfd::FileDialog::new()
                        .set_title("Save plot")
                        .set_file_name(name)
                        .add_filter("PNG", &["png"])
                        .save_file()
                        .map(Action::SaveCurrent);
                }
                if ui.add_enabled(idle, egui::Button::new("All plots…")).clicked() {
                    action = pick_folder("Save all plots into").map(Action::SaveAll);
                }
                if ui.add_enabled(idle, egui::Button::new("Create GIF")).clicked() {
                    action = match state.plot_dir.clone() {
                        Some(dir) => Some(Action::CreateGif(dir)),
                        None => pick_folder("Folder with plots").map(Action::CreateGif),
                    };
                }
            });

            if let Some(Busy::Batch { done, total }) = state.busy {
                let fraction = if total == 0 { 0.0 } else { done as f32 / total as f32 };
                ui.add(egui::ProgressBar::new(fraction).text(format!("{done} / {total}")));
                if ui.button("Cancel").clicked() {
                    action = Some(Action::Cancel);
                }
            } else if state.busy.is_some() {
                ui.spinner();
            }
        });

    action
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open DAD data")
        .add_filter("Supported files", &["tsv", "txt", "csv", "parquet", "pq"])
        .add_filter("Tab separated", &["tsv", "txt"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

fn save_tsv_dialog(name: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title("Export data")
        .set_file_name(name)
        .add_filter("Tab separated", &["tsv", "txt"])
        .save_file()
}

fn pick_folder(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new().set_title(title).pick_folder()
}
