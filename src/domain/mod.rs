pub mod price;
pub mod track;
