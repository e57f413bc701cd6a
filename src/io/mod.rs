pub mod plan_writer;
pub mod scenario_reader;
pub mod settings_reader;

pub use scenario_reader::load_scenario;
