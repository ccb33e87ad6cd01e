use super::BindValue;

/// Append a bind value and return its 1-based placeholder index
pub(super) fn push_bind(bind_params: &mut Vec<BindValue>, value: BindValue) -> usize {
    bind_params.push(value);
    bind_params.len()
}
