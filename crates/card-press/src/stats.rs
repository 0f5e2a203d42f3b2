use crate::options::SheetOptions;
use crate::types::*;

/// Statistics about a print job, computed before any rendering happens.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintStatistics {
    /// Number of records in the job
    pub records: usize,
    /// Card slots on one sheet
    pub capacity_per_page: usize,
    /// Unique records printed per sheet (half the slots when fronts and
    /// backs share a sheet)
    pub unique_cards_per_page: usize,
    /// Output page count
    pub pages: usize,
    /// Unused record positions on the final sheet
    pub blank_slots: usize,
}

/// Calculate page counts for a job without rendering it.
pub fn calculate_statistics(
    record_count: usize,
    options: &SheetOptions,
    double_sided: bool,
) -> Result<PrintStatistics> {
    if record_count == 0 {
        return Err(PressError::NoRecords);
    }
    let capacity = options.columns * options.rows;
    if capacity == 0 {
        return Err(PressError::Config(
            "grid needs at least one column and one row".to_string(),
        ));
    }

    let unique_per_page = if double_sided && options.duplex == DuplexLayout::SharedSheet {
        capacity / 2
    } else {
        capacity
    };
    let sheets = record_count.div_ceil(unique_per_page);
    let pages = if double_sided && options.duplex == DuplexLayout::AlternatePages {
        sheets * 2
    } else {
        sheets
    };
    let blank_slots = sheets * unique_per_page - record_count;

    Ok(PrintStatistics {
        records: record_count,
        capacity_per_page: capacity,
        unique_cards_per_page: unique_per_page,
        pages,
        blank_slots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sided_pages_round_up() {
        let options = SheetOptions::default();
        let stats = calculate_statistics(45, &options, false).unwrap();
        assert_eq!(stats.pages, 3);
        assert_eq!(stats.unique_cards_per_page, 20);
        // Page 3 holds 5 cards.
        assert_eq!(stats.blank_slots, 15);
    }

    #[test]
    fn exact_fit_leaves_no_blanks() {
        let options = SheetOptions::default();
        let stats = calculate_statistics(40, &options, false).unwrap();
        assert_eq!(stats.pages, 2);
        assert_eq!(stats.blank_slots, 0);
    }

    #[test]
    fn shared_sheet_duplex_halves_the_capacity() {
        let options = SheetOptions::default();
        let stats = calculate_statistics(25, &options, true).unwrap();
        assert_eq!(stats.unique_cards_per_page, 10);
        assert_eq!(stats.pages, 3);
        // Last page: 5 fronts + 5 backs, 5 slots of the band unused.
        assert_eq!(stats.blank_slots, 5);
    }

    #[test]
    fn alternate_pages_duplex_doubles_the_pages() {
        let options = SheetOptions {
            duplex: DuplexLayout::AlternatePages,
            ..Default::default()
        };
        let stats = calculate_statistics(25, &options, true).unwrap();
        assert_eq!(stats.unique_cards_per_page, 20);
        assert_eq!(stats.pages, 4);
        assert_eq!(stats.blank_slots, 15);
    }

    #[test]
    fn empty_jobs_are_rejected() {
        let options = SheetOptions::default();
        assert!(matches!(
            calculate_statistics(0, &options, false),
            Err(PressError::NoRecords)
        ));
    }
}
