//! Transformation URL construction.
//!
//! The host renders composites server-side from a URL whose path is a
//! chain of transformation segments. Segment order is a contract: quality
//! base, logo overlay, optional element overlay, optional caption text,
//! then the background public id. The chain is modeled as an explicit
//! segment list folded into the final URL so that ordering stays testable
//! instead of living in inline string concatenation.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Default base URL of the render endpoint.
pub const DEFAULT_RENDER_BASE: &str = "https://res.cloudinary.com";

/// Characters left unescaped by JavaScript's `encodeURIComponent`:
/// alphanumerics plus `- _ . ! ~ * ' ( )`. The caption text was encoded
/// that way by the host's other clients, so the URL grammar expects it.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// One transformation step in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Logo pinned to the top-left corner at a fixed 120px width.
    LogoOverlay { public_id: String },
    /// Element overlay fitted and centered at the given dimensions.
    ElementOverlay {
        public_id: String,
        width: u32,
        height: u32,
    },
    /// Caption banner along the bottom edge, white on black, uppercased.
    CaptionText { text: String },
}

impl Segment {
    fn render(&self) -> String {
        match self {
            Segment::LogoOverlay { public_id } => {
                format!("l_{public_id},g_north_west,x_10,y_10,w_120")
            }
            Segment::ElementOverlay {
                public_id,
                width,
                height,
            } => format!("l_{public_id},w_{width},h_{height},c_fit,g_center"),
            Segment::CaptionText { text } => {
                let upper = text.to_uppercase();
                let encoded = utf8_percent_encode(&upper, URI_COMPONENT);
                format!(
                    "l_text:Roboto_28_bold:{encoded},co_rgb:FFFFFF,g_south,x_0,y_20,b_rgb:000000"
                )
            }
        }
    }
}

/// Overlay fraction of the background dimensions.
const ELEMENT_SCALE: f64 = 0.9;

/// Ordered transformation chain for one composite.
#[derive(Debug, Clone)]
pub struct TransformChain {
    render_base: String,
    cloud_name: String,
    background_id: String,
    segments: Vec<Segment>,
}

impl TransformChain {
    /// Start a chain for a background image on the given account.
    pub fn new(cloud_name: &str, background_id: &str) -> Self {
        Self {
            render_base: DEFAULT_RENDER_BASE.to_string(),
            cloud_name: cloud_name.to_string(),
            background_id: background_id.to_string(),
            segments: Vec::new(),
        }
    }

    /// Override the render base URL (used by tests).
    pub fn with_render_base(mut self, render_base: &str) -> Self {
        self.render_base = render_base.to_string();
        self
    }

    /// Append the logo overlay segment.
    pub fn logo(mut self, logo_public_id: &str) -> Self {
        self.segments.push(Segment::LogoOverlay {
            public_id: logo_public_id.to_string(),
        });
        self
    }

    /// Append the element overlay segment, sized to 90% of the background.
    ///
    /// Dimensions are floored, never rounded, so the overlay can never
    /// exceed the background bounds.
    pub fn element(mut self, element_public_id: &str, bg_width: u32, bg_height: u32) -> Self {
        let width = (f64::from(bg_width) * ELEMENT_SCALE).floor() as u32;
        let height = (f64::from(bg_height) * ELEMENT_SCALE).floor() as u32;
        self.segments.push(Segment::ElementOverlay {
            public_id: element_public_id.to_string(),
            width,
            height,
        });
        self
    }

    /// Append the caption text segment.
    pub fn caption(mut self, text: &str) -> Self {
        self.segments.push(Segment::CaptionText {
            text: text.to_string(),
        });
        self
    }

    /// Fold the chain into the final URL.
    ///
    /// Shape: `{base}/{cloud}/image/upload/q_50,f_webp[/segment...]/{bg}.webp`.
    pub fn build(&self) -> String {
        let mut url = format!(
            "{}/{}/image/upload/q_50,f_webp",
            self.render_base, self.cloud_name
        );
        for segment in &self.segments {
            url.push('/');
            url.push_str(&segment.render());
        }
        url.push('/');
        url.push_str(&self.background_id);
        url.push_str(".webp");
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logo_and_caption_without_element() {
        let url = TransformChain::new("democloud", "bg1")
            .logo("logo1")
            .caption("hello")
            .build();
        assert_eq!(
            url,
            "https://res.cloudinary.com/democloud/image/upload/q_50,f_webp\
             /l_logo1,g_north_west,x_10,y_10,w_120\
             /l_text:Roboto_28_bold:HELLO,co_rgb:FFFFFF,g_south,x_0,y_20,b_rgb:000000\
             /bg1.webp"
        );
    }

    #[test]
    fn full_chain_keeps_segment_order() {
        let url = TransformChain::new("democloud", "bg1")
            .logo("logo1")
            .element("el1", 1000, 500)
            .caption("hi")
            .build();
        let logo_pos = url.find("l_logo1").unwrap();
        let element_pos = url.find("l_el1").unwrap();
        let caption_pos = url.find("l_text:").unwrap();
        let bg_pos = url.find("/bg1.webp").unwrap();
        assert!(logo_pos < element_pos);
        assert!(element_pos < caption_pos);
        assert!(caption_pos < bg_pos);
    }

    #[test]
    fn element_dimensions_are_floored() {
        let url = TransformChain::new("c", "bg")
            .element("el", 1001, 999)
            .build();
        // floor(1001 * 0.9) = 900, floor(999 * 0.9) = 899
        assert!(url.contains("l_el,w_900,h_899,c_fit,g_center"));
    }

    #[test]
    fn caption_is_uppercased_and_url_escaped() {
        let url = TransformChain::new("c", "bg").caption("giảm giá 50%").build();
        assert!(url.contains("l_text:Roboto_28_bold:GI%E1%BA%A2M%20GI%C3%81%2050%25"));
    }

    #[test]
    fn bare_chain_is_base_plus_background() {
        let url = TransformChain::new("c", "bg").build();
        assert_eq!(
            url,
            "https://res.cloudinary.com/c/image/upload/q_50,f_webp/bg.webp"
        );
    }
}
