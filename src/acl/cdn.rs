//! Static allow-list of known third-party asset hosts
//!
//! Archived pages routinely pull scripts, fonts, images and embeds from a
//! small set of CDN and platform hosts that no Target declares as a seed.
//! These prefixes are always allowed regardless of any Target's scope, so
//! they are kept in final, open (subdomain-matching where unterminated)
//! form. This is configuration data, maintained by hand and versioned with
//! the crate, never derived at runtime.

/// Canonical prefixes for third-party hosts commonly referenced from
/// archived pages
pub const CDN_PREFIXES: &[&str] = &[
    // Blog platform asset hosts:
    "http://(com,wp,s0",
    "http://(com,wp,s1",
    "http://(com,wp,s2",
    "http://(com,wordpress,files,",
    "http://(com,blogspot,bp,",
    "http://(com,blogblog,img1",
    "http://(com,blogblog,img2",
    "http://(com,squarespace,static)",
    "http://(com,blogger)/img/",
    "http://(com,blogger)/static/",
    "http://(com,blogger)/dyn-css/",
    // Script and font CDNs:
    "http://(com,jquery,code",
    "http://(com,cloudflare,cdnjs",
    "http://(com,github,cloud",
    "http://(com,gravatar)/avatar/",
    "http://(com,gravatar,secure)/avatar/",
    "http://(com,googleusercontent,",
    "http://(com,googleapis,ajax",
    "http://(com,googleapis,fonts",
    "http://(com,google)/jsapi",
    "http://(com,google,apis",
    "http://(net,cloudfront,",
    "http://(net,typekit,use)",
    // Media hosts used by broadcaster news pages:
    "http://(uk,co,bbc,newsimg,",
    "http://(uk,co,bbcimg,",
    "http://(uk,co,bbci,",
    // YouTube embeds and the related video CDN:
    "http://(com,youtube)/embed/,",
    "http://(com,googlevideo,",
    "http://(com,youtube)/iframe_api",
    "http://(com,youtube)/get_video_info",
    "http://(com,youtube)/yts/",
    "http://(com,youtube,img",
    "http://(com,ytimg,i",
    // Twitter service worker, API and embeds:
    "http://(com,twitter)/sw.js",
    "http://(com,twitter)/i/api",
    "http://(com,twitter,api)",
    "http://(com,twitter,platform",
    "http://(com,twimg,",
    // Facebook embeds:
    "http://(com,facebook)/plugins/like.php",
];

/// Iterates the CDN table in declaration order
pub fn cdn_entries() -> impl Iterator<Item = &'static str> {
    CDN_PREFIXES.iter().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_carry_scheme_marker() {
        for entry in cdn_entries() {
            assert!(
                entry.starts_with("http://("),
                "CDN entry missing scheme marker: {}",
                entry
            );
        }
    }

    #[test]
    fn test_no_duplicate_entries() {
        let unique: std::collections::BTreeSet<_> = cdn_entries().collect();
        assert_eq!(unique.len(), CDN_PREFIXES.len());
    }
}
