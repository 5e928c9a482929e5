//! Pagination of filtered variant streams.

use crate::{err::Error, model::Variant};

/// One page of variants together with the number of all matches.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariantPage {
    pub variants: Vec<Variant>,
    /// Number of all variants passing the filter, independent of the page.
    pub total: usize,
}

/// Skip the first `skip` variants of `iter`, keep the next `count` ones and
/// count all of them.
///
/// The whole stream is consumed to determine the exact total; variants
/// after the page are counted but not retained.  The first error aborts
/// the pagination.
pub fn paginate<I>(iter: I, skip: usize, count: usize) -> Result<VariantPage, Error>
where
    I: Iterator<Item = Result<Variant, Error>>,
{
    let mut page = VariantPage::default();
    for variant in iter {
        let variant = variant?;
        if page.total >= skip && page.variants.len() < count {
            page.variants.push(variant);
        }
        page.total += 1;
    }
    tracing::debug!(
        "returning {} of {} variants after skipping {}",
        page.variants.len(),
        page.total,
        skip
    );
    Ok(page)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::paginate;
    use crate::{err::Error, model::Variant};

    fn stream(n: u64) -> impl Iterator<Item = Result<Variant, Error>> {
        (1..=n).map(|pos| Ok(Variant::new("1", pos, ".", "A", "C", None, "PASS")))
    }

    fn positions(variants: &[Variant]) -> Vec<u64> {
        variants.iter().map(|v| v.pos).collect()
    }

    #[rstest]
    #[case(0, 5, vec![1, 2, 3, 4, 5])]
    #[case(10, 5, vec![11, 12, 13, 14])]
    #[case(3, 2, vec![4, 5])]
    #[case(20, 5, vec![])]
    #[case(0, 0, vec![])]
    fn page_and_total(#[case] skip: usize, #[case] count: usize, #[case] expected: Vec<u64>) {
        let page = paginate(stream(14), skip, count).unwrap();
        assert_eq!(positions(&page.variants), expected);
        assert_eq!(page.total, 14);
    }

    #[test]
    fn page_is_slice_of_longer_page() -> Result<(), anyhow::Error> {
        for skip in 0..16 {
            for count in 0..6 {
                let page = paginate(stream(14), skip, count)?;
                let longer = paginate(stream(14), 0, skip + count)?;
                let lo = skip.min(longer.variants.len());
                assert_eq!(page.variants, longer.variants[lo..]);
                assert_eq!(page.total, longer.total);
            }
        }
        Ok(())
    }

    #[test]
    fn error_propagates() {
        let iter = stream(2).chain(std::iter::once(Err(Error::Parse("broken".into()))));
        assert!(matches!(paginate(iter, 0, 1), Err(Error::Parse(_))));
    }
}
