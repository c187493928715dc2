pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
    page_count: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn from(items: &'a [T], page_size: usize) -> Self {
        let page_size = page_size.max(1);
        let page_count = items.len().div_ceil(page_size);

        Paginator {
            items,
            page_size,
            page_count,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// Pages are numbered from 1
    pub fn get_page(&self, page: usize) -> Result<&'a [T], String> {
        match page {
            0 => return Err("Page has to be greater than 0".to_string()),
            x if x > self.page_count => return Err(format!("Page has to be less than page_count ({})", self.page_count)),
            _ => {}
        };

        let start = (page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.items.len());
        Ok(&self.items[start..end])
    }

    pub fn pages(&self) -> impl Iterator<Item = (usize, &'a [T])> + '_ {
        (1..=self.page_count).filter_map(move |page| self.get_page(page).ok().map(|items| (page, items)))
    }
}
