//! Homepage selection policy

/// Items shown on the homepage in total
pub const HOMEPAGE_MAX_ITEMS: usize = 4;

/// Items of each kind the homepage aims for
pub const HOMEPAGE_PREFERRED_EACH: usize = 2;

/// Pick the projects and blog posts shown on the homepage.
///
/// Both inputs are already sorted newest first, so the result is a prefix of
/// each. Two of each are preferred; when one kind has fewer than two, its
/// unused slots go to the other kind, up to four items in total.
pub fn select_homepage<'a, P, B>(projects: &'a [P], blog: &'a [B]) -> (&'a [P], &'a [B]) {
    let mut project_count = projects.len().min(HOMEPAGE_PREFERRED_EACH);
    let mut blog_count = blog.len().min(HOMEPAGE_PREFERRED_EACH);
    let remaining = HOMEPAGE_MAX_ITEMS - project_count - blog_count;

    if blog_count < HOMEPAGE_PREFERRED_EACH {
        project_count += remaining.min(projects.len() - project_count);
    } else if project_count < HOMEPAGE_PREFERRED_EACH {
        blog_count += remaining.min(blog.len() - blog_count);
    }

    (&projects[..project_count], &blog[..blog_count])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(p: usize, b: usize) -> (usize, usize) {
        let projects: Vec<usize> = (0..p).collect();
        let blog: Vec<usize> = (0..b).collect();
        let (sp, sb) = select_homepage(&projects, &blog);
        (sp.len(), sb.len())
    }

    #[test]
    fn test_prefers_two_of_each() {
        assert_eq!(counts(5, 5), (2, 2));
        assert_eq!(counts(2, 4), (2, 2));
        assert_eq!(counts(2, 2), (2, 2));
    }

    #[test]
    fn test_unused_slots_move_to_the_other_kind() {
        assert_eq!(counts(5, 1), (3, 1));
        assert_eq!(counts(5, 0), (4, 0));
        assert_eq!(counts(1, 5), (1, 3));
        assert_eq!(counts(0, 3), (0, 3));
    }

    #[test]
    fn test_small_sites() {
        assert_eq!(counts(0, 0), (0, 0));
        assert_eq!(counts(1, 1), (1, 1));
        assert_eq!(counts(3, 1), (3, 1));
    }

    #[test]
    fn test_returns_newest_prefix() {
        let projects = ["p1", "p2", "p3", "p4", "p5"];
        let blog = ["b1"];
        let (p, b) = select_homepage(&projects, &blog);
        assert_eq!(p, &["p1", "p2", "p3"]);
        assert_eq!(b, &["b1"]);
    }
}
