/// 按顺序把记录切分为至多 `size` 条的分块
///
/// 除最后一块外每块恰好 `size` 条；空输入返回唯一一个空分块。
/// `size` 为 0 时按 1 处理。
pub fn partition<T: Clone>(records: &[T], size: usize) -> Vec<Vec<T>> {
    if records.is_empty() {
        return vec![Vec::new()];
    }
    records.chunks(size.max(1)).map(<[T]>::to_vec).collect()
}
