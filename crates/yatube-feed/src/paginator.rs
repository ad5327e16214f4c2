use std::num::IntErrorKind;

use yatube_types::models::Page;

/// Reads a `?page=` value. Missing or non-numeric input means page 1; a
/// number below 1 maps to 0, which [`Paginator::clamp`] turns into the last
/// page. Integers of any size count as numbers.
pub fn parse_page(raw: Option<&str>) -> u32 {
    match raw.map(str::trim).map(str::parse::<i64>) {
        Some(Ok(n)) if n < 1 => 0,
        Some(Ok(n)) => u32::try_from(n).unwrap_or(u32::MAX),
        Some(Err(e)) => match e.kind() {
            IntErrorKind::PosOverflow => u32::MAX,
            IntErrorKind::NegOverflow => 0,
            _ => 1,
        },
        None => 1,
    }
}

/// Splits `total` items into fixed-size, 1-indexed pages. Out-of-range
/// requests are clamped to the last page instead of failing.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
    total: u64,
    per_page: u32,
}

impl Paginator {
    pub fn new(total: u64, per_page: u32) -> Self {
        Self {
            total,
            per_page: per_page.max(1),
        }
    }

    /// Always at least one page, even when there is nothing to show.
    pub fn num_pages(&self) -> u32 {
        if self.total == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn clamp(&self, requested: u32) -> u32 {
        let last = self.num_pages();
        if requested == 0 || requested > last {
            last
        } else {
            requested
        }
    }

    /// `(offset, limit)` of an already clamped page.
    pub fn window(&self, number: u32) -> (u64, u64) {
        let per_page = u64::from(self.per_page);
        (u64::from(number.saturating_sub(1)) * per_page, per_page)
    }

    pub fn page<T>(&self, number: u32, items: Vec<T>) -> Page<T> {
        let num_pages = self.num_pages();
        Page {
            items,
            number,
            num_pages,
            total: self.total,
            page_size: self.per_page,
            has_next: number < num_pages,
            has_previous: number > 1,
        }
    }

    /// Paginate a collection that is already in memory.
    pub fn paginate<T: Clone>(all: &[T], per_page: u32, requested: u32) -> Page<T> {
        let paginator = Self::new(all.len() as u64, per_page);
        let number = paginator.clamp(requested);
        let (offset, limit) = paginator.window(number);
        let items = all
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        paginator.page(number, items)
    }
}
