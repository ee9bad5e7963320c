use std::path::PathBuf;

pub mod panels;
pub mod plot;
pub mod table;

/// Requests raised by widgets and carried out by the app, which owns the
/// worker channel.
pub enum Action {
    Open(PathBuf),
    ExportWavelength(PathBuf),
    ExportAll(PathBuf),
    SaveCurrent(PathBuf),
    SaveAll(PathBuf),
    CreateGif(PathBuf),
    Cancel,
}
