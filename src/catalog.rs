use std::sync::LazyLock;

use rand::Rng;

use crate::models::{Gender, HairstyleOption, Language, Localized};

/// Reserved id shared by every synthesized random style.
pub const RANDOM_STYLE_ID: &str = "random_ai_gen";

/// Fixed description attached to reference-image results.
pub const REFERENCE_DESCRIPTION: &str = "Style transfer from image";

pub fn custom_label(language: Language) -> &'static str {
    match language { Language::En => "Custom", Language::Zh => "自定义" }
}

pub fn reference_label(language: Language) -> &'static str {
    match language { Language::En => "Reference", Language::Zh => "参考图" }
}

pub fn random_label(language: Language) -> &'static str {
    match language { Language::En => "Random Style", Language::Zh => "随机发型" }
}

pub fn generic_error(language: Language) -> &'static str {
    match language {
        Language::En => "Failed to generate the hairstyle. Please try again.",
        Language::Zh => "发型生成失败，请重试。",
    }
}

struct Preset {
    id: &'static str,
    label: (&'static str, &'static str),
    description: (&'static str, &'static str),
    prompt: &'static str,
    gender: &'static [Gender],
    preview_color: &'static str,
}

const BOTH: &[Gender] = &[Gender::Female, Gender::Male];
const FEMALE: &[Gender] = &[Gender::Female];
const MALE: &[Gender] = &[Gender::Male];

const PRESETS: &[Preset] = &[
    Preset {
        id: "short-bob",
        label: ("Short Bob", "短波波头"),
        description: ("Chin-length, sleek and modern", "齐下巴长度，利落时尚"),
        prompt: "a sleek chin-length bob cut with clean blunt ends",
        gender: FEMALE,
        preview_color: "bg-amber-200",
    },
    Preset {
        id: "long-waves",
        label: ("Long Waves", "长卷发"),
        description: ("Soft beach waves past the shoulders", "过肩的柔和波浪卷"),
        prompt: "long soft beach waves falling past the shoulders",
        gender: FEMALE,
        preview_color: "bg-yellow-300",
    },
    Preset {
        id: "pixie-cut",
        label: ("Pixie Cut", "精灵短发"),
        description: ("Cropped and playful", "俏皮的超短发"),
        prompt: "a cropped textured pixie cut",
        gender: FEMALE,
        preview_color: "bg-rose-200",
    },
    Preset {
        id: "curtain-bangs",
        label: ("Curtain Bangs", "八字刘海"),
        description: ("Mid-length layers with parted fringe", "中长层次搭配中分刘海"),
        prompt: "mid-length layered hair with face-framing curtain bangs",
        gender: FEMALE,
        preview_color: "bg-orange-200",
    },
    Preset {
        id: "buzz-cut",
        label: ("Buzz Cut", "寸头"),
        description: ("Clean, even clipper cut", "干净利落的平推短发"),
        prompt: "a very short even buzz cut",
        gender: MALE,
        preview_color: "bg-stone-400",
    },
    Preset {
        id: "undercut",
        label: ("Undercut", "削边头"),
        description: ("Short sides, long textured top", "两侧铲短，顶部留长"),
        prompt: "an undercut with shaved sides and a long textured top swept back",
        gender: MALE,
        preview_color: "bg-slate-400",
    },
    Preset {
        id: "slick-back",
        label: ("Slick Back", "背头"),
        description: ("Polished and combed back", "光亮整齐的大背头"),
        prompt: "glossy slicked-back hair combed away from the face",
        gender: MALE,
        preview_color: "bg-zinc-500",
    },
    Preset {
        id: "afro",
        label: ("Afro", "爆炸头"),
        description: ("Full, rounded natural curls", "饱满圆润的自然卷"),
        prompt: "a full rounded natural afro with defined coils",
        gender: BOTH,
        preview_color: "bg-amber-700",
    },
    Preset {
        id: "mullet",
        label: ("Modern Mullet", "现代鲻鱼头"),
        description: ("Short front, longer back", "前短后长的复古造型"),
        prompt: "a modern textured mullet, short at the front and longer at the back",
        gender: BOTH,
        preview_color: "bg-lime-300",
    },
    Preset {
        id: "silver-pixie",
        label: ("Silver Crop", "银灰短发"),
        description: ("Short cut dyed metallic silver", "金属银灰色短发"),
        prompt: "a short cropped cut dyed metallic silver grey",
        gender: BOTH,
        preview_color: "bg-gray-300",
    },
];

static CATALOG: LazyLock<Vec<HairstyleOption>> = LazyLock::new(|| {
    PRESETS.iter().map(|p| HairstyleOption {
        id: p.id.to_string(),
        label: Localized::new(p.label.0, p.label.1),
        description: Localized::new(p.description.0, p.description.1),
        prompt: p.prompt.to_string(),
        gender: p.gender.to_vec(),
        preview_color: p.preview_color.to_string(),
    }).collect()
});

pub fn hairstyle_options() -> &'static [HairstyleOption] {
    &CATALOG
}

pub fn find_option(id: &str) -> Option<&'static HairstyleOption> {
    CATALOG.iter().find(|opt| opt.id == id)
}

// --- Random style components: (en, zh) ---

const LENGTHS: &[(&str, &str)] = &[
    ("short", "短发"),
    ("chin-length", "齐下巴"),
    ("shoulder-length", "齐肩"),
    ("long", "长发"),
    ("extra long", "超长发"),
];

const TEXTURES: &[(&str, &str)] = &[
    ("straight", "直顺"),
    ("wavy", "波浪"),
    ("curly", "卷曲"),
    ("coily", "螺旋卷"),
    ("textured", "纹理"),
    ("sleek", "光滑"),
];

const COLORS: &[(&str, &str)] = &[
    ("jet black", "乌黑"),
    ("chestnut brown", "栗棕色"),
    ("honey blonde", "蜂蜜金"),
    ("platinum", "铂金色"),
    ("copper red", "铜红色"),
    ("ash grey", "烟灰色"),
    ("pastel pink", "粉彩色"),
    ("ocean blue", "海蓝色"),
];

const STYLES: &[(&str, &str)] = &[
    ("bob", "波波头"),
    ("layered cut", "层次剪"),
    ("ponytail", "马尾"),
    ("shag", "羊毛剪"),
    ("pompadour", "飞机头"),
    ("braids", "编发"),
    ("bun", "丸子头"),
];

fn pick<R: Rng + ?Sized>(pool: &'static [(&'static str, &'static str)], rng: &mut R) -> (&'static str, &'static str) {
    // pools are const and non-empty
    pool[rng.gen_range(0..pool.len())]
}

/// Samples one value from each component pool and composes a fresh option
/// carrying the reserved random id.
pub fn random_style<R: Rng + ?Sized>(rng: &mut R) -> HairstyleOption {
    let length = pick(LENGTHS, rng);
    let texture = pick(TEXTURES, rng);
    let color = pick(COLORS, rng);
    let style = pick(STYLES, rng);

    HairstyleOption {
        id: RANDOM_STYLE_ID.to_string(),
        label: Localized::new(
            format!("{} {}", color.0, style.0),
            format!("{}{}", color.1, style.1),
        ),
        description: Localized::new(
            format!("A {}, {} style in {}", length.0, texture.0, color.0),
            format!("{}、{}{}造型", length.1, texture.1, color.1),
        ),
        prompt: format!("a {}, {} {} {} hairstyle", length.0, texture.0, color.0, style.0),
        gender: vec![Gender::Female, Gender::Male],
        preview_color: "bg-gradient-to-r from-purple-500 to-pink-500".to_string(),
    }
}
