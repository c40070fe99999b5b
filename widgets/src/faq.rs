/// Exclusive accordion: opening one question closes the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accordion {
    len: usize,
    open: Option<usize>,
}

impl Accordion {
    pub fn new(len: usize) -> Self {
        Self { len, open: None }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_open(&self, index: usize) -> bool {
        self.open == Some(index)
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    /// Returns whether `index` is open afterwards.
    pub fn toggle(&mut self, index: usize) -> bool {
        if index >= self.len {
            log::debug!("FAQ item {} out of range ({} items)", index, self.len);
            return false;
        }
        if self.open == Some(index) {
            self.open = None;
            false
        } else {
            self.open = Some(index);
            true
        }
    }

    /// Opens the item named by a `#faq-N` fragment (1-based, as in the
    /// rendered anchors).
    pub fn open_from_hash(&mut self, hash: &str) -> Option<usize> {
        let number: usize = hash.strip_prefix("#faq-")?.parse().ok()?;
        let index = number.checked_sub(1).filter(|i| *i < self.len)?;
        self.open = Some(index);
        Some(index)
    }

    pub fn anchor(index: usize) -> String {
        format!("faq-{}", index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opening_one_closes_the_others() {
        let mut faq = Accordion::new(3);
        assert!(faq.toggle(0));
        assert!(faq.toggle(2));
        assert!(!faq.is_open(0));
        assert!(faq.is_open(2));
        assert!(!faq.toggle(2));
        assert_eq!(faq.open_index(), None);
    }

    #[test]
    fn out_of_range_toggle_is_ignored() {
        let mut faq = Accordion::new(2);
        assert!(!faq.toggle(5));
        assert_eq!(faq.open_index(), None);
    }

    #[test]
    fn hash_opens_matching_item() {
        let mut faq = Accordion::new(4);
        assert_eq!(faq.open_from_hash("#faq-3"), Some(2));
        assert!(faq.is_open(2));
        assert_eq!(faq.open_from_hash("#faq-0"), None);
        assert_eq!(faq.open_from_hash("#faq-9"), None);
        assert_eq!(faq.open_from_hash("#pricing"), None);
        assert!(faq.is_open(2));
        assert_eq!(Accordion::anchor(2), "faq-3");
    }
}
