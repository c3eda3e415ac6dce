pub mod threaded_kiosk_runner;
