pub mod value_tracker;
