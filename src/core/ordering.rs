use crate::domain::model::WebmapItem;
use crate::utils::error::{NgwError, Result};

pub trait DisplayNamed {
    fn display_name(&self) -> &str;
}

impl DisplayNamed for WebmapItem {
    fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Moves the layers named in `orderlist` to the front, in `orderlist` order.
/// Layers not named keep their relative order at the end.
///
/// A name repeated in `orderlist` counts at its first position. Layers that
/// share a display name move together and keep their relative order. Names
/// without a matching layer are ignored. Both lists must be non-empty.
pub fn sort_layers_by_list<T, S>(layers: Vec<T>, orderlist: &[S]) -> Result<Vec<T>>
where
    T: DisplayNamed,
    S: AsRef<str>,
{
    if orderlist.is_empty() {
        return Err(NgwError::precondition("order list must not be empty"));
    }
    if layers.is_empty() {
        return Err(NgwError::precondition("layer list must not be empty"));
    }

    let mut ranked: Vec<(usize, T)> = layers
        .into_iter()
        .map(|layer| {
            let rank = orderlist
                .iter()
                .position(|name| name.as_ref() == layer.display_name())
                .unwrap_or(usize::MAX);
            (rank, layer)
        })
        .collect();

    // stable: unmatched layers all rank usize::MAX
    ranked.sort_by_key(|(rank, _)| *rank);

    Ok(ranked.into_iter().map(|(_, layer)| layer).collect())
}
