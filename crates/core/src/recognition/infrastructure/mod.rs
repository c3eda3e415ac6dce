pub mod http_face_recognizer;
