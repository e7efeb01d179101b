//! Shelf packing of merged quads into a near-square texture atlas.
//!
//! Quads are placed tallest-first onto shelves of a fixed-width atlas whose
//! width is the side of the smallest square that could hold the total area.
//! Output is deterministic: the sort is stable over input order.

use crate::faces::FaceQuad;

/// Assigns `atlas` offsets to every quad; returns `(width, height)` of the
/// resulting atlas in cell units. Empty input packs to `(0, 0)`.
pub fn pack_atlas(quads: &mut [FaceQuad]) -> (i32, i32) {
    if quads.is_empty() {
        return (0, 0);
    }
    let total: i64 = quads
        .iter()
        .map(|q| q.width() as i64 * q.height() as i64)
        .sum();
    let widest = quads.iter().map(|q| q.width()).max().unwrap_or(1);
    // Square-area side, but never narrower than the widest quad.
    let side = ((total as f64).sqrt().ceil() as i32).max(widest);

    let mut order: Vec<usize> = (0..quads.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(quads[i].height()));

    let mut cur_x = 0i32;
    let mut cur_y = 0i32;
    let mut shelf_h = 0i32;
    for &i in &order {
        let (w, h) = (quads[i].width(), quads[i].height());
        if cur_x + w > side {
            cur_y += shelf_h;
            cur_x = 0;
            shelf_h = 0;
        }
        quads[i].atlas = [cur_x, cur_y];
        cur_x += w;
        shelf_h = shelf_h.max(h);
    }
    (side, cur_y + shelf_h)
}
