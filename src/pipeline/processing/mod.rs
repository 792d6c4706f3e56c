// Pipeline processing: field resolution, region abbreviation, evidence scoring

pub mod evidence;
pub mod fields;
pub mod normalize;
pub mod states;
