use label_fusion::volume::{Dims, Label, LabelVolume, ProbabilityStack, ScalarVolume};

/// Label volume laid out along x.
pub fn row(labels: &[Label]) -> LabelVolume {
    LabelVolume::from_vec(Dims::new(labels.len(), 1, 1), labels.to_vec())
        .expect("row buffer matches its dims")
}

/// Probability stack along x; `per_voxel[i]` is the vector at voxel `i`.
pub fn row_stack(per_voxel: &[&[f64]]) -> ProbabilityStack {
    let dims = Dims::new(per_voxel.len(), 1, 1);
    let label_count = per_voxel.first().map_or(0, |v| v.len());
    let fields = (0..label_count)
        .map(|l| {
            let data = per_voxel.iter().map(|v| v[l]).collect();
            ScalarVolume::from_vec(dims, data).expect("field buffer matches its dims")
        })
        .collect();
    ProbabilityStack::new(fields)
}

/// One-hot style fields: `confidence` on the voxel's label, the rest spread
/// evenly over the other labels.
pub fn confident_stack(
    labels: &LabelVolume,
    label_count: usize,
    confidence: f64,
) -> ProbabilityStack {
    let rest = (1.0 - confidence) / (label_count - 1) as f64;
    let fields = (0..label_count)
        .map(|l| {
            let data = labels
                .data
                .iter()
                .map(|&v| if v as usize == l { confidence } else { rest })
                .collect();
            ScalarVolume::from_vec(labels.dims, data).expect("field buffer matches its dims")
        })
        .collect();
    ProbabilityStack::new(fields)
}

/// Four classifiers split 2:2 on voxel 0 and unanimous (label 3) on voxel 1.
///
/// At voxel 0 the first+second+neighbour score prefers label 2 while the
/// first+neighbour score prefers label 1; classifiers voting 1 are the more
/// certain ones.
pub fn ambiguous_pair() -> (Vec<LabelVolume>, Vec<ProbabilityStack>) {
    let labels = vec![row(&[1, 3]), row(&[1, 3]), row(&[2, 3]), row(&[2, 3])];
    let sure: &[f64] = &[0.0, 0.9, 0.05, 0.05];
    let unsure: &[f64] = &[0.0, 0.1, 0.6, 0.3];
    let three: &[f64] = &[0.0, 0.0, 0.0, 1.0];
    let stacks = vec![
        row_stack(&[sure, three]),
        row_stack(&[sure, three]),
        row_stack(&[unsure, three]),
        row_stack(&[unsure, three]),
    ];
    (labels, stacks)
}
