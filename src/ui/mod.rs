/// Rendering only: widgets read and mutate `AppState`, never the data layer directly.
pub mod charts;
pub mod panels;
