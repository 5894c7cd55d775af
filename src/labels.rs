use crate::error::PredictError;

/// Disease names in the order of the model's output units.
pub const CLASS_LABELS: [&str; 20] = [
    "Healthy",
    "Coffee Leaf Rust",
    "Cercospora Leaf Spot",
    "Phoma Leaf Spot",
    "Anthracnose",
    "Algal Leaf Spot",
    "Brown Eye Spot",
    "Fusarium Wilt",
    "Root Rot",
    "Bacterial Blight",
    "Coffee Berry Disease (CBD)",
    "Verticillium Wilt",
    "Black Rot",
    "American Leaf Spot",
    "Pink Disease",
    "Root Knot Nematode",
    "Coffee Berry Borer",
    "Rust - Hemileia vastatrix",
    "Wilt - Fusarium spp.",
    "**New Disease or Unknown**",
];

/// Index of the highest score. Equal maxima resolve to the lowest index.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Maps a probability vector to its label.
pub fn resolve<'a>(scores: &[f32], labels: &[&'a str]) -> Result<&'a str, PredictError> {
    if scores.len() != labels.len() {
        tracing::warn!(
            "Model returned {} scores but the label table has {} entries",
            scores.len(),
            labels.len()
        );
    }

    if let Some(position) = scores.iter().position(|score| score.is_nan()) {
        return Err(PredictError::Inference(format!(
            "model returned NaN at index {}",
            position
        )));
    }

    let index = argmax(scores)
        .ok_or_else(|| PredictError::Inference("model returned no scores".into()))?;

    labels
        .get(index)
        .copied()
        .ok_or(PredictError::IndexOutOfBounds {
            index,
            labels: labels.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_hot(index: usize, len: usize) -> Vec<f32> {
        let mut scores = vec![0.01; len];
        scores[index] = 0.9;
        scores
    }

    #[test]
    fn every_index_resolves_to_its_label() {
        for (i, label) in CLASS_LABELS.iter().enumerate() {
            assert_eq!(resolve(&one_hot(i, 20), &CLASS_LABELS).unwrap(), *label);
        }
    }

    #[test]
    fn index_one_is_coffee_leaf_rust() {
        assert_eq!(
            resolve(&one_hot(1, 20), &CLASS_LABELS).unwrap(),
            "Coffee Leaf Rust"
        );
    }

    #[test]
    fn ties_go_to_the_lowest_index() {
        assert_eq!(argmax(&[0.1, 0.4, 0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5; 20]), Some(0));
    }

    #[test]
    fn empty_scores_have_no_argmax() {
        assert_eq!(argmax(&[]), None);
        assert!(matches!(
            resolve(&[], &CLASS_LABELS),
            Err(PredictError::Inference(_))
        ));
    }

    #[test]
    fn nan_scores_are_an_inference_error() {
        for scores in [
            vec![0.9, f32::NAN, 0.1],
            vec![f32::NAN, 0.2, 0.7, 0.1],
        ] {
            let err = resolve(&scores, &CLASS_LABELS).unwrap_err();
            assert!(matches!(err, PredictError::Inference(_)));
            assert!(err.to_string().contains("NaN"));
        }
    }

    #[test]
    fn index_past_the_table_is_an_error() {
        let err = resolve(&one_hot(23, 25), &CLASS_LABELS).unwrap_err();
        assert!(matches!(
            err,
            PredictError::IndexOutOfBounds {
                index: 23,
                labels: 20
            }
        ));
    }

    #[test]
    fn longer_vector_still_resolves_inside_the_table() {
        assert_eq!(resolve(&one_hot(4, 25), &CLASS_LABELS).unwrap(), "Anthracnose");
    }
}
