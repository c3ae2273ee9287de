use std::f64::consts::PI;

use crate::partition::Partition;

impl Partition {
    /// Polsby-Popper compactness, 4πA/P². A district without perimeter scores 1.
    pub(crate) fn polsby_popper(&self, part: usize) -> f64 {
        let perimeter = self.part_perimeter(part);
        if perimeter <= 0.0 { return 1.0 }
        4.0 * PI * self.part_area(part) / (perimeter * perimeter)
    }

    /// Schwartzberg compactness: circumference of the equal-area circle over the perimeter.
    pub(crate) fn schwartzberg(&self, part: usize) -> f64 {
        let perimeter = self.part_perimeter(part);
        if perimeter <= 0.0 { return 1.0 }
        2.0 * PI * (self.part_area(part).max(0.0) / PI).sqrt() / perimeter
    }
}
