use crate::description::time_part;

/// 合計時間をfragmentへ配分する。
///
/// weight未指定のfragmentは合計時間の1/n(nはfragment数)を受け取る。
/// weight指定のあるfragmentは、weight指定分へ割り当てた時間
/// `(k/n) * total_hours`(kはweight指定のあるfragment数)をweight比で分け合う。
/// この2段構えの規則により配分の合計は常に`total_hours`と一致する。
pub fn allocate(fragments: &[String], total_hours: f64) -> Vec<(String, f64)> {
    let weights: Vec<u32> = fragments.iter().map(|f| time_part(f)).collect();
    let specified: Vec<u32> = weights.iter().copied().filter(|w| *w != 0).collect();
    let one_part = if specified.is_empty() {
        0.0
    } else {
        (specified.len() as f64 / fragments.len() as f64) * total_hours
            / specified.iter().sum::<u32>() as f64
    };

    fragments
        .iter()
        .zip(weights)
        .map(|(fragment, weight)| {
            let hours = if weight == 0 {
                total_hours / fragments.len() as f64
            } else {
                one_part * weight as f64
            };
            (fragment.clone(), hours)
        })
        .collect()
}
