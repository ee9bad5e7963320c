use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, PREVIEW_ROWS};

// ---------------------------------------------------------------------------
// Data tab – raw series preview
// ---------------------------------------------------------------------------

/// Render the first rows of the loaded series as a table.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let Some(series) = &state.series else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view data  (File → Open…)");
        });
        return;
    };

    let rows = series.len().min(PREVIEW_ROWS);
    ui.label(format!("showing {rows} of {} rows", series.len()));

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(70.0))
            .columns(Column::initial(60.0).at_least(40.0), series.channels.len())
            .header(20.0, |mut header| {
                header.col(|ui: &mut Ui| {
                    ui.strong(&series.time_label);
                });
                for channel in &series.channels {
                    header.col(|ui: &mut Ui| {
                        ui.strong(&channel.label);
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, rows, |mut row| {
                    let i = row.index();
                    row.col(|ui: &mut Ui| {
                        ui.label(format!("{:.4}", series.time[i]));
                    });
                    for channel in &series.channels {
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.1}", channel.absorbance[i]));
                        });
                    }
                });
            });
    });
}
