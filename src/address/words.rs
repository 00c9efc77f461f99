//! Dictionary for the `words` format

/// Short, unambiguous lowercase words
pub const WORDS: &[&str] = &[
    "able", "acid", "aged", "also", "area", "army", "away", "baby", "back", "ball", "band", "bank",
    "base", "bath", "bear", "beat", "bell", "belt", "bird", "blow", "blue", "boat", "body", "bond",
    "bone", "book", "boom", "born", "boss", "both", "bowl", "bulk", "burn", "bush", "busy", "cake",
    "call", "calm", "camp", "card", "care", "cart", "case", "cash", "cast", "cell", "chef", "chip",
    "city", "clay", "club", "coal", "coat", "code", "cold", "cook", "cool", "cope", "copy", "core",
    "corn", "cost", "crew", "crop", "dark", "dash", "data", "date", "dawn", "deal", "dear", "deck",
    "deep", "desk", "dial", "dice", "dish", "dock", "door", "dose", "down", "draw", "drop", "drum",
    "duck", "dust", "duty", "each", "earn", "east", "easy", "edge", "else", "even", "ever", "face",
    "fact", "fair", "fall", "farm", "fast", "fate", "fern", "file", "fill", "film", "find", "fine",
    "fire", "firm", "fish", "five", "flag", "flat", "flow", "folk", "food", "foot", "fork", "form",
    "fort", "four", "free", "frog", "fuel", "full", "fund", "gain", "game", "gate", "gear", "gift",
    "girl", "glad", "glow", "goal", "gold", "golf", "good", "gray", "grid", "grow", "gulf", "hair",
    "half", "hall", "hand", "hang", "hard", "harp", "hawk", "head", "heat", "herb", "hero", "hide",
    "high", "hill", "hint", "hold", "hole", "home", "hook", "hope", "horn", "host", "hour", "huge",
    "idea", "inch", "iron", "item", "jazz", "join", "joke", "jump", "jury", "keen", "keep", "kind",
    "king", "kite", "knee", "knot", "lake", "lamp", "land", "lane", "last", "late", "lawn", "lead",
    "leaf", "lean", "left", "lens", "life", "lift", "like", "lime", "line", "link", "lion", "list",
    "live", "load", "loan", "lock", "loft", "long", "loop", "lord", "love", "luck", "lung", "made",
    "mail", "main", "make", "malt", "many", "mark", "mask", "mast", "meal", "meet", "melt", "menu",
    "mild", "milk", "mill", "mind", "mint", "mode", "moon", "more", "moss", "most", "move", "much",
    "myth", "nail", "name", "navy", "near", "neat", "neck", "nest", "news", "next", "nice", "nine",
    "node", "noon", "nose", "note", "oak", "oath", "open", "oval", "oven", "pace", "pack", "page",
    "pain", "pair", "palm", "park", "part", "past", "path", "peak", "pear", "pine", "pink", "pipe",
    "plan", "play", "plot", "plum", "poem", "pole", "pond", "pool", "port", "pose", "post", "pull",
    "pure", "quiz", "race", "rack", "rain", "rank", "rare", "reed", "rest", "rice", "rich", "ride",
    "ring", "rise", "road", "rock", "roof", "room", "root", "rope", "rose", "ruby", "rule", "safe",
    "sage", "sail", "salt", "sand", "save", "seal", "seat", "seed", "ship", "shoe", "shop", "silk",
    "sing", "site", "size", "skip", "slow", "snow", "soap", "sock", "soft", "soil", "song", "soup",
    "star", "stem", "step", "suit", "sun", "surf", "swan", "tail", "tale", "tall", "tank", "tape",
    "task", "team", "tent", "term", "test", "text", "tide", "tile", "time", "tiny", "tone", "tool",
    "tour", "town", "tree", "trip", "tune", "twin", "unit", "vast", "verb", "very", "vest", "view",
    "vine", "void", "vote", "wage", "wait", "wake", "walk", "wall", "warm", "wave", "weed", "well",
    "west", "whip", "wide", "wild", "wind", "wine", "wing", "wire", "wise", "wolf", "wood", "wool",
    "word", "work", "yard", "yarn", "year", "yoga", "zero", "zinc", "zone",
];
