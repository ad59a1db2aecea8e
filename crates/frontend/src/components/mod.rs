pub mod forecast_panel;
pub mod map_view;
