/// Box of a token or line in page space, origin at the top-left corner.
///
/// `top` and `bottom` are distances from the top of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Line height, used as the unit for paragraph gaps.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Smallest box covering both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.top.min(other.top),
            self.x1.max(other.x1),
            self.bottom.max(other.bottom),
        )
    }

    /// The box grown by `padding` on all four sides.
    pub fn expand(&self, padding: f64) -> BBox {
        BBox::new(
            self.x0 - padding,
            self.top - padding,
            self.x1 + padding,
            self.bottom + padding,
        )
    }

    /// Whether `inner` fits inside, touching edges allowed.
    pub fn contains(&self, inner: &BBox) -> bool {
        self.x0 <= inner.x0
            && inner.x1 <= self.x1
            && self.top <= inner.top
            && inner.bottom <= self.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_covers_both_tokens() {
        let word = BBox::new(72.0, 100.0, 110.0, 110.0);
        let next = BBox::new(114.0, 99.5, 150.0, 111.0);
        assert_eq!(word.union(&next), BBox::new(72.0, 99.5, 150.0, 111.0));
        assert_eq!(word.union(&next).height(), 11.5);
    }

    #[test]
    fn test_padded_table_box_takes_overhanging_token() {
        let table = BBox::new(70.0, 300.0, 540.0, 420.0);
        let token = BBox::new(69.0, 301.0, 90.0, 311.0);
        assert!(!table.contains(&token));
        assert!(table.expand(2.0).contains(&token));
        assert!(table.contains(&table));
    }
}
