/// Most images a single album can hold
pub const MAX_ALBUM_IMAGES: usize = 20;
/// Events per album, leaving one slot for the intro image
pub const DEFAULT_BATCH_SIZE: usize = MAX_ALBUM_IMAGES - 1;

/// Split items into consecutive batches of at most `size`, keeping order
///
/// No items means no batches. A `size` of zero is treated as one.
pub fn batch<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut batches = Vec::with_capacity(items.len().div_ceil(size));
    let mut items = items.into_iter().peekable();

    while items.peek().is_some() {
        batches.push(items.by_ref().take(size).collect());
    }

    batches
}
