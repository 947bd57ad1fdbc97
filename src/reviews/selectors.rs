//! CSS selectors for Amazon review listing pages.
//!
//! This file contains every selector used to read a review page.
//! Update this file when Amazon changes their HTML structure; the parser
//! and crawler only refer to these names.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the fields of a single review block.
pub mod review {
    use super::*;

    /// Review container - one customer review per match.
    pub static FRAGMENT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.a-section.review.aok-relative").unwrap());

    /// Reviewer display name.
    pub static NAME: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.a-profile-name").unwrap());

    /// Star rating text, e.g. "4.0 out of 5 stars".
    pub static RATING: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "i[data-hook='review-star-rating'] span.a-icon-alt, \
             i[data-hook='cmps-review-star-rating'] span.a-icon-alt, \
             span.a-icon-alt",
        )
        .unwrap()
    });

    /// Separator between the score and the scale in the rating text.
    pub const RATING_SEPARATOR: &str = "out";

    /// Review body text.
    pub static BODY: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "span.a-size-base.review-text.review-text-content, \
             span[data-hook='review-body']",
        )
        .unwrap()
    });
}

/// Selectors for the pagination control.
pub mod pagination {
    use super::*;

    /// "Next page" item rendered as disabled on the last page.
    pub static DISABLED_LAST: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("li.a-disabled.a-last").unwrap());

    /// "Next page" item. Also matches the disabled form, so check that first.
    pub static NEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.a-last").unwrap());
}

/// Selectors for detecting bot walls.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });
}
