use crate::pipeline::expanded::expand_list;
use crate::{ExpandedState, PaginationState, RowModel};

/// Slices one page out of `model.rows`.
///
/// `expand` is set when expansion was deferred past pagination: the page is cut from the
/// unexpanded rows and expanded afterwards. Flat rows are the page rows and their descendants.
pub(crate) fn paginate<T>(
    model: &RowModel<T>,
    pagination: PaginationState,
    expand: Option<&ExpandedState>,
) -> RowModel<T> {
    let len = model.rows.len();
    let size = pagination.page_size.max(1);
    let start = pagination.page_index.saturating_mul(size).min(len);
    let end = start.saturating_add(size).min(len);
    let page = &model.rows[start..end];

    let rows = match expand {
        Some(expanded) => expand_list(page, expanded),
        None => page.to_vec(),
    };
    tdebug!(
        page_index = pagination.page_index,
        page_size = size,
        rows = rows.len(),
        "paginated row model built"
    );
    RowModel::from_rows(rows)
}
