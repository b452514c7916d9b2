pub mod evaluate;
pub mod panel;
pub mod specs;
