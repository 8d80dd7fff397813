//! Region segmentation over a contour-profiled page.

use image::{DynamicImage, GrayImage};
use imageproc::contours::{find_contours, BorderType, Contour};

use crate::types::document::Region;

fn bounding_box(contour: &Contour<u32>) -> Option<Region> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Region::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Repeatedly merge overlapping regions until none overlap.
fn merge_overlapping(mut regions: Vec<Region>) -> Vec<Region> {
    let mut merged = true;
    while merged {
        merged = false;
        let mut out: Vec<Region> = Vec::with_capacity(regions.len());
        for region in regions {
            match out.iter_mut().find(|existing| existing.overlaps(&region)) {
                Some(existing) => {
                    *existing = existing.union(&region);
                    merged = true;
                }
                None => out.push(region),
            }
        }
        regions = out;
    }
    regions
}

/// Find the text blocks on a binarized page.
///
/// Outermost contours are boxed; boxes smaller than `min_area` are
/// dropped, overlapping boxes are merged, and the result is sorted top to
/// bottom, then left to right.
pub fn segment(binary: &GrayImage, min_area: u64) -> Vec<Region> {
    let boxes: Vec<Region> = find_contours::<u32>(binary)
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(bounding_box)
        .filter(|r| r.area() >= min_area)
        .collect();

    let mut regions = merge_overlapping(boxes);
    regions.sort_by_key(Region::reading_key);
    regions
}

/// Number of qualifying regions on a binarized page.
pub fn count_regions(binary: &GrayImage, min_area: u64) -> usize {
    segment(binary, min_area).len()
}

/// Crop each region out of the original page, in the given order.
pub fn crop_regions(page: &DynamicImage, regions: &[Region]) -> Vec<(Region, DynamicImage)> {
    regions
        .iter()
        .map(|region| (*region, region.crop(page)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;
    use proptest::prelude::*;

    fn canvas() -> GrayImage {
        GrayImage::from_pixel(300, 200, Luma([0]))
    }

    fn block(img: &mut GrayImage, x: i32, y: i32, w: u32, h: u32) {
        draw_filled_rect_mut(img, Rect::at(x, y).of_size(w, h), Luma([255]));
    }

    #[test]
    fn test_segment_sorts_in_reading_order() {
        let mut img = canvas();
        block(&mut img, 200, 20, 50, 40);
        block(&mut img, 20, 20, 50, 40);
        block(&mut img, 20, 120, 100, 50);

        let regions = segment(&img, 1000);

        assert_eq!(
            regions,
            vec![
                Region::new(20, 20, 50, 40),
                Region::new(200, 20, 50, 40),
                Region::new(20, 120, 100, 50),
            ]
        );
    }

    #[test]
    fn test_small_boxes_are_noise() {
        let mut img = canvas();
        block(&mut img, 10, 10, 10, 10);
        block(&mut img, 100, 100, 60, 30);

        let regions = segment(&img, 1000);
        assert_eq!(regions, vec![Region::new(100, 100, 60, 30)]);
        assert_eq!(count_regions(&canvas(), 1000), 0);
    }

    #[test]
    fn test_nested_contours_are_ignored() {
        let mut img = canvas();
        block(&mut img, 20, 20, 200, 150);
        draw_filled_rect_mut(&mut img, Rect::at(40, 40).of_size(160, 110), Luma([0]));
        block(&mut img, 60, 60, 50, 30);

        let regions = segment(&img, 1000);
        assert_eq!(regions, vec![Region::new(20, 20, 200, 150)]);
    }

    #[test]
    fn test_merge_overlapping() {
        let merged = merge_overlapping(vec![
            Region::new(0, 0, 50, 50),
            Region::new(100, 100, 10, 10),
            Region::new(40, 40, 30, 30),
            Region::new(65, 0, 10, 45),
        ]);

        assert_eq!(
            merged,
            vec![Region::new(0, 0, 75, 70), Region::new(100, 100, 10, 10)]
        );
    }

    #[test]
    fn test_crop_regions() {
        let page = DynamicImage::new_luma8(100, 100);
        let crops = crop_regions(&page, &[Region::new(10, 10, 20, 30)]);

        assert_eq!(crops.len(), 1);
        assert_eq!((crops[0].1.width(), crops[0].1.height()), (20, 30));
    }

    proptest! {
        #[test]
        fn regions_are_large_disjoint_and_in_reading_order(
            blocks in prop::collection::vec((0i32..280, 0i32..180, 1u32..90, 1u32..60), 0..8),
            min_area in 1u64..2500,
        ) {
            let mut img = canvas();
            for (x, y, w, h) in blocks {
                block(&mut img, x, y, w, h);
            }

            let regions = segment(&img, min_area);

            for region in &regions {
                prop_assert!(region.area() >= min_area);
            }
            for pair in regions.windows(2) {
                prop_assert!(pair[0].reading_key() <= pair[1].reading_key());
            }
            for (i, a) in regions.iter().enumerate() {
                for b in &regions[i + 1..] {
                    prop_assert!(!a.overlaps(b));
                }
            }
        }
    }
}
