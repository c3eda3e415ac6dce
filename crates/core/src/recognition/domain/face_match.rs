use serde::{Deserialize, Serialize};

/// A detected face in image-pixel coordinates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    #[serde(default)]
    pub id: u32,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// A face matched to an enrolled student.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognizedIdentity {
    pub student_id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub class_id: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub face_box: Option<FaceBox>,
}

/// One detected face and, if it was recognized, who it is.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceMatch {
    pub face: FaceBox,
    pub identity: Option<RecognizedIdentity>,
}

impl FaceMatch {
    pub fn is_matched(&self) -> bool {
        self.identity.is_some()
    }

    pub fn label(&self) -> String {
        match &self.identity {
            Some(identity) => format!("{} - {}", identity.student_id, identity.name),
            None => "Unknown".to_string(),
        }
    }
}

/// Result of one recognition call.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Recognition {
    pub matches: Vec<FaceMatch>,
    pub recognized_count: usize,
    pub message: String,
}

impl Recognition {
    /// Pairs index-aligned face and identity lists.
    ///
    /// Faces without a corresponding identity slot are unmatched; surplus
    /// identities with no face are dropped. `recognized_count` falls back to
    /// the number of matched faces when the service omits it.
    pub fn from_aligned(
        faces: Vec<FaceBox>,
        identities: Vec<Option<RecognizedIdentity>>,
        recognized_count: Option<usize>,
        message: String,
    ) -> Self {
        if identities.len() > faces.len() {
            log::warn!(
                "Recognition returned {} identities for {} faces; extra entries ignored",
                identities.len(),
                faces.len()
            );
        }
        let mut identities = identities.into_iter();
        let matches: Vec<FaceMatch> = faces
            .into_iter()
            .map(|face| FaceMatch {
                face,
                identity: identities.next().flatten(),
            })
            .collect();

        let matched = matches.iter().filter(|m| m.is_matched()).count();
        Self {
            recognized_count: recognized_count.unwrap_or(matched),
            matches,
            message,
        }
    }

    pub fn faces_count(&self) -> usize {
        self.matches.len()
    }

    pub fn identities(&self) -> impl Iterator<Item = &RecognizedIdentity> {
        self.matches.iter().filter_map(|m| m.identity.as_ref())
    }

    pub fn has_recognized(&self) -> bool {
        self.recognized_count > 0
    }
}
