pub mod history_days;
