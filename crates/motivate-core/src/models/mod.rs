pub mod coverage;
pub mod decision;
pub mod rubric;
pub mod score;
pub mod turn;
