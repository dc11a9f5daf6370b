pub mod bracket_nav;
pub mod score_chart;
