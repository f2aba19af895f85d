use crate::photoexport_core::catalog::AssetRecord;
use crate::photoexport_core::predicate::{Expr, Field};

pub const UTI_HEIC: &str = "public.heic";
pub const UTI_JPEG: &str = "public.jpeg";
pub const UTI_PNG: &str = "public.png";
pub const UTI_QUICKTIME: &str = "com.apple.quicktime-movie";
pub const UTI_MPEG4: &str = "public.mpeg-4";

/// Default capture-naming prefix used by the camera app.
const CAPTURE_PREFIX: &str = "IMG_";

/// Semantic category of a master asset. One category per asset;
/// precedence is the declaration order of `CATEGORIES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Photo,
    Video,
    Burst,
    Panorama,
    Square,
    SocialImport,
    Screenshot,
    SocialPhoto,
    SocialVideo,
    Unknown,
}

impl Category {
    /// Tally key and log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Photo => "photo",
            Category::Video => "video",
            Category::Burst => "burst",
            Category::Panorama => "panorama",
            Category::Square => "square",
            Category::SocialImport => "instagram",
            Category::Screenshot => "screenshot",
            Category::SocialPhoto => "whatsapp_photo",
            Category::SocialVideo => "whatsapp_video",
            Category::Unknown => "unknown",
        }
    }

    /// Token appended to the filename prefix of exported assets.
    pub fn tag_token(&self) -> &'static str {
        match self {
            Category::Photo | Category::Video => "",
            Category::Burst => "burst_",
            Category::Panorama => "panorama_",
            Category::Square => "square_",
            Category::SocialImport => "instagram_",
            Category::Screenshot => "screenshot_",
            Category::SocialPhoto => "whatsapp_photo_",
            Category::SocialVideo => "whatsapp_video_",
            Category::Unknown => "unknown_",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which companion file a category's assets may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanionKind {
    None,
    /// Live photo video, joined by content identifier.
    LiveVideo,
    /// Rendered slow-motion video, joined by corrected timestamp.
    RenderedSlomo,
}

/// What the pipeline does with a category's assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryAction {
    Export,
    /// Counted in the summary but not copied.
    TallyOnly,
}

#[derive(Debug, Clone, Copy)]
pub struct CategorySpec {
    pub category: Category,
    pub companion: CompanionKind,
    pub action: CategoryAction,
}

/// The fixed processing order. First matching predicate wins; the
/// pipeline guards each category's query with the negations of all
/// earlier ones, so the order is also the tie-break for rows that
/// satisfy more than one raw predicate.
pub const CATEGORIES: [CategorySpec; 9] = [
    CategorySpec {
        category: Category::Photo,
        companion: CompanionKind::LiveVideo,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::Video,
        companion: CompanionKind::RenderedSlomo,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::Burst,
        companion: CompanionKind::None,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::Panorama,
        companion: CompanionKind::None,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::Square,
        companion: CompanionKind::None,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::SocialImport,
        companion: CompanionKind::None,
        action: CategoryAction::Export,
    },
    CategorySpec {
        category: Category::Screenshot,
        companion: CompanionKind::None,
        action: CategoryAction::TallyOnly,
    },
    CategorySpec {
        category: Category::SocialPhoto,
        companion: CompanionKind::None,
        action: CategoryAction::TallyOnly,
    },
    CategorySpec {
        category: Category::SocialVideo,
        companion: CompanionKind::None,
        action: CategoryAction::TallyOnly,
    },
];

/// Filename fingerprint of UUID-named social-app files: hyphens at
/// 0-based offsets 8, 13, 18, 23 and a total length of exactly 40.
fn social_uuid_name() -> Expr {
    Expr::All(vec![
        Expr::CharAt(Field::Filename, 8, '-'),
        Expr::CharAt(Field::Filename, 13, '-'),
        Expr::CharAt(Field::Filename, 18, '-'),
        Expr::CharAt(Field::Filename, 23, '-'),
        Expr::LengthIs(Field::Filename, 40),
    ])
}

/// The defining predicate of a category. `Unknown` is the conjunction
/// of all other categories' negations.
pub fn category_expr(category: Category) -> Expr {
    match category {
        Category::Photo => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_HEIC.to_string()),
            Expr::IsNotNull(Field::GroupingId),
        ]),
        Category::Video => Expr::Eq(Field::TypeTag, UTI_QUICKTIME.to_string()),
        Category::Burst => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_JPEG.to_string()),
            Expr::IsNotNull(Field::BurstId),
            Expr::not(social_uuid_name()),
        ]),
        Category::Panorama => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_HEIC.to_string()),
            Expr::IsNull(Field::GroupingId),
            Expr::IsNull(Field::BurstId),
            Expr::DiffersFrom(Field::Width, Field::Height),
        ]),
        Category::Square => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_HEIC.to_string()),
            Expr::IsNull(Field::GroupingId),
            Expr::IsNull(Field::BurstId),
            Expr::SameAs(Field::Width, Field::Height),
        ]),
        Category::SocialImport => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_JPEG.to_string()),
            Expr::Any(vec![
                Expr::IsNotNull(Field::GroupingId),
                Expr::All(vec![Expr::IsNotNull(Field::BurstId), social_uuid_name()]),
            ]),
        ]),
        Category::Screenshot => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_PNG.to_string()),
            Expr::StartsWith(Field::Filename, CAPTURE_PREFIX.to_string()),
        ]),
        Category::SocialPhoto => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_JPEG.to_string()),
            Expr::IsNull(Field::BurstId),
            Expr::IsNull(Field::GroupingId),
            social_uuid_name(),
        ]),
        Category::SocialVideo => Expr::All(vec![
            Expr::Eq(Field::TypeTag, UTI_MPEG4.to_string()),
            social_uuid_name(),
        ]),
        Category::Unknown => residue_expr(),
    }
}

/// A category's predicate AND the negation of every earlier category's
/// predicate. Applying this at the query level makes the precedence
/// order structural: no row can be selected by two categories.
pub fn precedence_expr(index: usize) -> Expr {
    let mut parts = vec![category_expr(CATEGORIES[index].category)];
    for earlier in &CATEGORIES[..index] {
        parts.push(Expr::not(category_expr(earlier.category)));
    }
    Expr::All(parts)
}

/// Matches assets that fall into no category at all.
pub fn residue_expr() -> Expr {
    Expr::All(
        CATEGORIES
            .iter()
            .map(|spec| Expr::not(category_expr(spec.category)))
            .collect(),
    )
}

/// Classify a record in memory: first matching category in the fixed
/// order, `Unknown` if none matches.
pub fn classify(record: &AssetRecord) -> Category {
    for spec in &CATEGORIES {
        if category_expr(spec.category).matches(record) {
            return spec.category;
        }
    }
    Category::Unknown
}
