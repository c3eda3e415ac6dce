pub mod shared {
    pub mod api_client;
    pub mod clock;
    pub mod constants;
    pub mod encoded_frame;
    pub mod frame;
    pub mod settings;
}

pub mod capture {
    pub mod domain {
        pub mod camera;
        pub mod frame_encoder;
        pub mod frame_extractor;
        pub mod scheduler;
        pub mod tick_gate;
    }
    pub mod infrastructure;
}

pub mod recognition {
    pub mod domain {
        pub mod face_match;
        pub mod face_recognizer;
    }
    pub mod infrastructure;
}

pub mod attendance {
    pub mod domain {
        pub mod attendance_record;
        pub mod catalog;
        pub mod checkin_service;
        pub mod class_resolver;
        pub mod dedup_ledger;
    }
    pub mod infrastructure;
}

pub mod overlay {
    pub mod domain {
        pub mod overlay;
        pub mod overlay_renderer;
    }
    pub mod infrastructure;
}

pub mod kiosk {
    pub mod capture_controller;
    pub mod infrastructure;
    pub mod kiosk_error;
    pub mod kiosk_notifier;
    pub mod kiosk_runner;
    pub mod run_kiosk_use_case;
}
