//! Embedded language tables
//!
//! Declaration order matters: it is the tie-break order for the detector.

use super::{LanguageFamily, MorphologySpec, ProfileSpec};

pub(crate) const FALLBACK_CODE: &str = "en";

pub(crate) const PROFILES: &[ProfileSpec] = &[
    ProfileSpec {
        code: "en",
        name: "English",
        family: LanguageFamily::Germanic,
        greeting: "Hello",
        vocabulary: &[
            "the", "and", "is", "are", "you", "how", "what", "hello", "please", "help", "with",
            "my", "have", "this", "that", "for", "can", "thank", "would", "could", "about",
            "your", "want", "need", "know", "where", "when", "why", "today", "good", "morning",
            "write", "explain", "question",
        ],
        fingerprints: &[
            "the", "and", "ing", "ion", "you", "hat", "her", "tha", "ere", "ent", "for", "his",
            "hel", "ell", "llo", "how", "are", "wha", "ave", "ith", "thi", "oul",
        ],
        cultural_markers: &[
            "good morning",
            "good afternoon",
            "thank you",
            "how are you",
            "kind regards",
            "dear sir",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "af",
        name: "Afrikaans",
        family: LanguageFamily::Germanic,
        greeting: "Hallo",
        vocabulary: &[
            "die", "het", "nie", "ek", "jy", "ons", "hulle", "asseblief", "dankie", "baie",
            "goed", "wat", "hoe", "waar", "hallo", "môre", "middag", "wil", "kan", "met", "vir",
            "van", "ook", "maar", "weet", "dink", "praat", "verstaan", "vandag", "nou", "gaan",
            "kom", "sal", "moet", "hierdie", "daardie", "goeie", "totsiens",
        ],
        fingerprints: &[
            "die", "nie", "een", "ver", "aar", "oor", "sie", "eer", "van", "gee", "ees", "oed",
            "kie", "ank", "dan", "baa", "aie", "lie", "ons", "ult", "geb", "oei",
        ],
        cultural_markers: &[
            "goeie môre",
            "baie dankie",
            "hoe gaan dit",
            "totsiens",
            "meneer",
            "mevrou",
            "tannie",
        ],
        distinctive_chars: &['ŉ', 'ê', 'ë', 'ô', 'û', 'î'],
    },
    ProfileSpec {
        code: "zu",
        name: "isiZulu",
        family: LanguageFamily::Nguni,
        greeting: "Sawubona",
        vocabulary: &[
            "sawubona", "yebo", "ngiyabonga", "unjani", "ngicela", "usizo", "wami", "wena",
            "mina", "kakhulu", "manje", "namhlanje", "ukuthi", "kodwa", "futhi", "lapha",
            "khona", "ngiyaphila", "umuntu", "abantu", "izinto", "ngoba", "kanjani", "yini",
            "phela", "umthetho", "ngomthetho", "uyakwazi", "ngifuna", "siyabonga", "kuhle",
            "indaba",
        ],
        fingerprints: &[
            "ngi", "nga", "ukh", "hla", "thi", "aba", "ama", "izi", "kwa", "eli", "ela", "ona",
            "bon", "abo", "yab", "uku", "nda", "kha", "phi", "hle", "lok",
        ],
        cultural_markers: &[
            "sawubona",
            "ngiyabonga",
            "unjani",
            "yebo baba",
            "hamba kahle",
            "sala kahle",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "xh",
        name: "isiXhosa",
        family: LanguageFamily::Nguni,
        greeting: "Molo",
        vocabulary: &[
            "molo", "molweni", "enkosi", "ndiyabulela", "ndicela", "uncedo", "ndifuna",
            "ndiyaphila", "ngoku", "apha", "kwaye", "ndiyavuya", "ewe", "hayi", "isixhosa",
            "ndithetha", "ubomi", "ekhaya", "abahlobo", "ndingakunceda", "ingxaki", "nceda",
        ],
        fingerprints: &[
            "ndi", "nce", "ced", "osi", "kos", "enk", "olo", "mol", "lwe", "wen", "xho", "bul",
            "ule", "ngx", "gxa", "thu", "ewe", "ayi", "hay",
        ],
        cultural_markers: &[
            "molweni",
            "enkosi",
            "ndiyabulela",
            "molo sisi",
            "molo bhuti",
            "camagu",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "nr",
        name: "isiNdebele",
        family: LanguageFamily::Nguni,
        greeting: "Lotjhani",
        vocabulary: &[
            "lotjhani", "ngiyathokoza", "ngiyakuthokoza", "ngibawa", "tjhe", "iye",
            "isindebele", "ngitjho", "godu", "abantwana", "isikolo", "umsebenzi", "ukutjho",
            "ngimuhle", "lotjhanini",
        ],
        fingerprints: &[
            "tjh", "jha", "han", "oko", "hok", "tho", "tok", "baw", "awa", "nde", "ebe", "bel",
            "ele", "god", "odu", "ant", "twa", "wan",
        ],
        cultural_markers: &["lotjhani", "ngiyathokoza", "lotjhani baba", "lotjhani mma"],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "ss",
        name: "siSwati",
        family: LanguageFamily::Nguni,
        greeting: "Sawubona",
        vocabulary: &[
            "kutsi", "umtsetfo", "lamuhla", "ngitsandza", "bantfu", "emanti", "tindzaba",
            "kute", "tfutfuka", "sifundvo", "umfundzisi", "ngiyavuma", "siswati", "ngekutsi",
            "tfola", "lokusha",
        ],
        fingerprints: &[
            "tsi", "uts", "tfu", "fut", "tse", "set", "etf", "ndz", "dza", "tsa", "ndv", "dvo",
            "mts", "lam", "muh", "uhl", "ant", "nti", "kut", "ahl",
        ],
        cultural_markers: &[
            "sawubona make",
            "sawubona babe",
            "salani kahle",
            "lisiko lemaswati",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "st",
        name: "Sesotho",
        family: LanguageFamily::SothoTswana,
        greeting: "Dumela",
        vocabulary: &[
            "kea", "leboha", "hle", "kopo", "thuso", "molao", "ntate", "ho", "ena", "na", "eng",
            "joang", "kajeno", "hantle", "haholo", "bophelo", "motho", "batho", "lebitso",
            "sesotho", "ntho", "hobane", "tseba", "kopa",
        ],
        fingerprints: &[
            "ela", "leb", "ebo", "boh", "oha", "hle", "ant", "tle", "kop", "opa", "tho", "eng",
            "hob", "oba", "ane", "jwa", "tse", "seb", "ots", "mol", "lao",
        ],
        cultural_markers: &[
            "dumela",
            "kea leboha",
            "ntate",
            "mme",
            "sala hantle",
            "tsamaya hantle",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "tn",
        name: "Setswana",
        family: LanguageFamily::SothoTswana,
        greeting: "Dumela",
        vocabulary: &[
            "leboga", "tsweetswee", "rra", "jang", "gompieno", "thata", "botshelo", "setswana",
            "gonne", "itse", "batla", "sentle", "tlhaloso", "thusa", "dilo", "bana", "legae",
            "ntlha",
        ],
        fingerprints: &[
            "ebo", "bog", "oga", "twe", "wee", "tsw", "swe", "ats", "rra", "mma", "jan", "ang",
            "gom", "omp", "pie", "ien", "sen", "ent", "ntl", "tha", "ata", "bot",
        ],
        cultural_markers: &[
            "dumela rra",
            "dumela mma",
            "ke a leboga",
            "tsamaya sentle",
            "sala sentle",
        ],
        distinctive_chars: &[],
    },
    ProfileSpec {
        code: "nso",
        name: "Sepedi",
        family: LanguageFamily::SothoTswana,
        greeting: "Thobela",
        vocabulary: &[
            "thobela", "aowa", "ee", "kgopela", "thušo", "bjang", "lehono", "kudu", "sepedi",
            "gobane", "nyaka", "kgoši", "ngwana", "gae", "mošomo", "kgopelo", "mmušo",
        ],
        fingerprints: &[
            "tho", "hob", "obe", "bel", "ela", "kgo", "gop", "ope", "pel", "bja", "jan", "kud",
            "udu", "ehl", "hon", "ono", "nya", "yak", "aka", "gwa", "wan", "ped", "edi",
        ],
        cultural_markers: &[
            "thobela",
            "dumelang",
            "ke leboga kudu",
            "sala gabotse",
            "tsamaya gabotse",
        ],
        distinctive_chars: &['š'],
    },
    ProfileSpec {
        code: "ve",
        name: "Tshivenda",
        family: LanguageFamily::Venda,
        greeting: "Ndaa",
        vocabulary: &[
            "ndaa", "livhuwa", "vho", "vhathu", "zwavhuḓi", "nne", "inwi", "ndi", "ni", "mini",
            "ngani", "ṋamusi", "tshivenda", "muthu", "zwino", "ndo", "khou", "humbela",
            "mulayo",
        ],
        fingerprints: &[
            "vhu", "uvh", "vho", "hat", "ndi", "liv", "ivh", "huw", "uwa", "zwa", "wav", "dza",
            "hum", "umb", "mbe", "ela", "tsh", "shi", "ven", "end", "nwi", "inw",
        ],
        cultural_markers: &["ndaa", "ndi a livhuwa", "ndo livhuwa", "kha vha takale"],
        distinctive_chars: &['ḓ', 'ḽ', 'ṅ', 'ṋ', 'ṱ'],
    },
    ProfileSpec {
        code: "ts",
        name: "Xitsonga",
        family: LanguageFamily::Tsonga,
        greeting: "Avuxeni",
        vocabulary: &[
            "avuxeni", "xewani", "inkomu", "khensa", "ndza", "swi", "xitsonga", "munhu", "vanhu",
            "namuntlha", "ngopfu", "lava", "rivoningo", "nawu", "pfuna", "pfuneto", "xikolo",
            "kombela", "ntirho", "hikwalaho", "xana",
        ],
        fingerprints: &[
            "xew", "ewa", "wan", "avu", "vux", "uxe", "xen", "khe", "hen", "ens", "nsa", "ndz",
            "dza", "swi", "xit", "its", "ton", "ong", "nga", "nhu", "pfu", "fun", "opf", "ngo",
        ],
        cultural_markers: &[
            "avuxeni",
            "xewani",
            "inkomu",
            "ndza khensa",
            "famba kahle",
            "u pfukile",
        ],
        distinctive_chars: &[],
    },
];

pub(crate) const MORPHOLOGY: &[MorphologySpec] = &[
    MorphologySpec {
        family: LanguageFamily::Nguni,
        patterns: &[
            // subject and instrumental concords
            r"\b(?:ngi|ngo|nga|ndi|ngiya|ndiya)\w{2,}",
            // noun class prefixes
            r"\b(?:uku|ukw|umu|aba|abe|izi|isi|imi|ubu|ulu)\w{2,}",
        ],
        members: &[("zu", 1.0), ("xh", 0.95), ("ss", 0.8), ("nr", 0.75)],
    },
    MorphologySpec {
        family: LanguageFamily::SothoTswana,
        patterns: &[
            r"\b\w*(?:tlh|tsw|kgo|hlo|tsh)\w*",
            r"\b(?:bo|se|di|mo)(?:th|tl|tsh|kg|ph)\w+",
            r"\b(?:ke|re|ba|o)\s+a\s+\w{3,}",
        ],
        members: &[("st", 1.0), ("tn", 0.9), ("nso", 0.85)],
    },
    MorphologySpec {
        family: LanguageFamily::Germanic,
        patterns: &[
            r"\bge\w{3,}[dte]\b",
            r"\w+(?:tjie|tjies|heid|lik|lyk)\b",
            r"\b(?:nie|ook|baie)\b",
        ],
        members: &[("af", 1.0)],
    },
    MorphologySpec {
        family: LanguageFamily::Venda,
        patterns: &[r"\b(?:vh|zw|dz)\w+", r"\b(?:ndi|ri|vha|u)\s+khou\b"],
        members: &[("ve", 1.0)],
    },
    MorphologySpec {
        family: LanguageFamily::Tsonga,
        patterns: &[r"\b(?:xi|swi)\w{2,}", r"\b\w*(?:pf|xw|hw)\w*"],
        members: &[("ts", 1.0)],
    },
];
