//! Page model: one rasterized, OCR'd page of an uploaded document.
//!
//! Pages are built once at ingestion from the OCR service's output and are
//! immutable afterwards. The cascade consumes only the token sets; bounding
//! boxes are carried through for downstream consumers (field extraction,
//! debug overlays) and never inspected here.

mod stopwords;

pub use stopwords::STOP_WORDS;

use std::collections::HashSet;

use uuid::Uuid;

/// Axis-aligned bounding box. Pixel coordinates for [`Page::bboxes`],
/// [0, 1] normalized coordinates for [`Page::normalized_bboxes`].
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Divides each coordinate by the image dimensions.
    pub fn normalized(&self, image_width: u32, image_height: u32) -> Self {
        let w = f64::from(image_width.max(1));
        let h = f64::from(image_height.max(1));
        Self {
            x1: self.x1 / w,
            y1: self.y1 / h,
            x2: self.x2 / w,
            y2: self.y2 / h,
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(b: [f64; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

/// One page of an upload, ready for classification.
#[derive(Debug, Clone)]
pub struct Page {
    /// Stable page id assigned when the upload's pages were registered in
    /// the store. Crosswalk rows reference it, so it must survive
    /// re-ingestion of the same physical page.
    pub id: Uuid,
    /// Source filename of the upload this page belongs to.
    pub filename: String,
    /// 1-based, contiguous per upload.
    pub page_number: u32,
    /// Blob-store key of the preprocessed page image.
    pub image_key: String,
    pub image_width: u32,
    pub image_height: u32,
    /// Recognized words, in reading order.
    pub words: Vec<String>,
    /// One pixel-coordinate box per word.
    pub bboxes: Vec<BoundingBox>,
    /// Boxes divided by image dimensions, range [0, 1].
    pub normalized_bboxes: Vec<BoundingBox>,
    /// Lowercased words, in reading order.
    pub tokens: Vec<String>,
    /// Classification-ready tokens: lowercased, stop-words removed,
    /// order-irrelevant. Used only for scoring.
    pub clf_tokens: HashSet<String>,
}

impl Page {
    /// Builds a page from the OCR service's per-page output. The caller
    /// supplies the store-assigned page id; pages never mint their own.
    #[allow(clippy::too_many_arguments)]
    pub fn from_ocr(
        id: Uuid,
        filename: impl Into<String>,
        page_number: u32,
        image_key: impl Into<String>,
        image_width: u32,
        image_height: u32,
        words: Vec<String>,
        bboxes: Vec<BoundingBox>,
    ) -> Self {
        let normalized_bboxes = bboxes
            .iter()
            .map(|b| b.normalized(image_width, image_height))
            .collect();

        let tokens: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();
        let clf_tokens = tokens
            .iter()
            .filter(|t| !t.is_empty() && !STOP_WORDS.contains(t.as_str()))
            .cloned()
            .collect();

        Self {
            id,
            filename: filename.into(),
            page_number,
            image_key: image_key.into(),
            image_width,
            image_height,
            words,
            bboxes,
            normalized_bboxes,
            tokens,
            clf_tokens,
        }
    }

    /// Number of classification-ready tokens, used by the cascade's
    /// text-heavy short-circuit.
    pub fn clf_token_count(&self) -> usize {
        self.clf_tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(ws: &[&str]) -> Vec<String> {
        ws.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn tokens_are_lowercased() {
        let page = Page::from_ocr(
            Uuid::new_v4(),
            "scan.pdf",
            1,
            "scan/page_1/preprocessed.png",
            100,
            100,
            words(&["Schedule", "K-1"]),
            vec![
                BoundingBox::new(0.0, 0.0, 10.0, 10.0),
                BoundingBox::new(10.0, 0.0, 20.0, 10.0),
            ],
        );

        assert_eq!(page.tokens, vec!["schedule", "k-1"]);
    }

    #[test]
    fn clf_tokens_drop_stop_words() {
        let page = Page::from_ocr(
            Uuid::new_v4(),
            "scan.pdf",
            1,
            "key",
            100,
            100,
            words(&["the", "employer", "and", "identification"]),
            vec![],
        );

        assert!(page.clf_tokens.contains("employer"));
        assert!(page.clf_tokens.contains("identification"));
        assert!(!page.clf_tokens.contains("the"));
        assert!(!page.clf_tokens.contains("and"));
        assert_eq!(page.clf_token_count(), 2);
    }

    #[test]
    fn clf_tokens_deduplicate() {
        let page = Page::from_ocr(
            Uuid::new_v4(),
            "scan.pdf",
            1,
            "key",
            100,
            100,
            words(&["lease", "lease", "lease"]),
            vec![],
        );

        assert_eq!(page.clf_token_count(), 1);
    }

    #[test]
    fn bboxes_normalize_to_unit_range() {
        let page = Page::from_ocr(
            Uuid::new_v4(),
            "scan.pdf",
            1,
            "key",
            200,
            400,
            words(&["word"]),
            vec![BoundingBox::new(50.0, 100.0, 150.0, 300.0)],
        );

        let nb = page.normalized_bboxes[0];
        assert_eq!(nb, BoundingBox::new(0.25, 0.25, 0.75, 0.75));
    }

    #[test]
    fn zero_dimensions_do_not_divide_by_zero() {
        let b = BoundingBox::new(5.0, 5.0, 10.0, 10.0).normalized(0, 0);
        assert!(b.x1.is_finite() && b.y2.is_finite());
    }
}
