//! Slot Value Extractor for Hotel Conversations
//!
//! Rule-based extraction from Chinese and English messages. Each slot has its
//! own ordered rule set; rules of different slots run independently so one
//! message can fill several slots. The output is a set of raw candidates that
//! still have to pass schema validation.

use chrono::{NaiveDate, Utc};
use hotel_planner_core::{CityReference, RawSlotValue, SlotId};
use hotel_planner_text_processing::{
    add_nights, month_from_english, normalize_message, parse_number, parse_ymd,
    relative_day_offset, resolve_end, resolve_month_day, to_iso, EN_NUMBER_PATTERN,
    NUMBER_PATTERN,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::Arc;

use super::rules::{Gazetteer, Rule, RuleContext, RuleSet};

/// Smallest amount read as a nightly budget when no currency is given
pub(crate) const MIN_PLAUSIBLE_BUDGET: i64 = 50;

/// Longest stay accepted from an "N nights" phrase
const MAX_NIGHTS: i64 = 60;

const ISO_DATE: &str = r"\d{4}[-/.]\d{1,2}[-/.]\d{1,2}";
const EN_MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const RANGE_SEP: &str = r"(?:到|至|~|-|to|until|through|till)";
const RELATIVE_DAY: &str = r"(?:大后天|后天|明天|今天|明晚|今晚|the day after tomorrow|day after tomorrow|tomorrow|tonight|today)";
const AMOUNT: &str = r"(\d+(?:\.\d+)?|[零一二两三四五六七八九十百千]+)\s*(k\b|千|万|w\b)?";
const CURRENCY_PREFIX: &str = r"(?:¥|￥|\$|€|rmb|cny|jpy|usd)";
const CURRENCY_SUFFIX: &str = r"(?:元|块|日元|円|美元|欧元|人民币|rmb|yuan|yen|usd|dollars?)";
const CLAUSE_CHARS: &str = r"[^\s,，。！？!?、;；]";

static ISO_PART: Lazy<Regex> = Lazy::new(|| Regex::new(&format!(r"^{}$", ISO_DATE)).unwrap());
static ZH_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"({n})\s*月\s*({n})", n = NUMBER_PATTERN)).unwrap()
});
static EN_MONTH_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\b({})\b", EN_MONTH)).unwrap());
static DAY_PART: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({n})\s*(?:[日号]|st|nd|rd|th)?$", n = NUMBER_PATTERN)).unwrap()
});
static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{1,2}").unwrap());
static SKIP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)都可以|都行|随便|无所谓|没有要求|没要求|没什么要求|不限|没有偏好|no preference|doesn'?t matter|any is fine|anything is fine|whatever|either is fine|no particular",
    )
    .unwrap()
});

/// Short replies that carry no place name: greetings, acknowledgements,
/// "don't know"
static NOT_A_PLACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:你好|您好|哈喽|嗨|hi|hello|hey|ok|okay|好|好的|行|可以|嗯+|哦+|噢+|是|是的|对|对的|不是|没有|yes|yeah|yep|no|nope|sure|fine)$|不知道|不清楚|没想好|还没定|不确定|谢谢|感谢|not sure|don'?t know|no idea|\bidk\b|thanks|thank you",
    )
    .unwrap()
});

/// Fragments that mark a city candidate as a misread clause
const CITY_STOP_FRAGMENTS: &[&str] = &[
    "想", "要", "找", "靠近", "附近", "预算", "星", "便宜", "性价比", "推荐", "什么", "哪", "一家",
    "一下", "这里",
];

/// Leading words stripped from area candidates
const AREA_PREFIXES: &[&str] = &["想住在", "想住", "住在", "最好在", "最好", "希望", "住", "在"];

const AREA_KEYWORDS: &[(&str, &[&str])] = &[
    ("市中心", &["市中心", "city center", "city centre", "downtown"]),
    ("商圈", &["商圈", "商业区", "shopping district"]),
    ("景点", &["景点", "attraction", "attractions"]),
    ("机场", &["机场", "airport"]),
    ("车站", &["车站", "火车站", "train station", "station"]),
    ("地铁站", &["近地铁", "地铁", "subway", "metro"]),
    ("海边", &["海边", "海滩", "beach", "beachfront", "seaside"]),
    ("老城区", &["老城区", "老城", "old town"]),
    ("银座", &["银座", "ginza"]),
    ("新宿", &["新宿", "shinjuku"]),
    ("涩谷", &["涩谷", "shibuya"]),
    ("原宿", &["原宿", "harajuku"]),
    ("六本木", &["六本木", "roppongi"]),
    ("丸之内", &["丸之内", "marunouchi"]),
    ("浅草", &["浅草", "asakusa"]),
    ("外滩", &["外滩", "the bund"]),
    ("陆家嘴", &["陆家嘴", "lujiazui"]),
    ("王府井", &["王府井", "wangfujing"]),
    ("三里屯", &["三里屯", "sanlitun"]),
    ("中环", &["中环"]),
    ("尖沙咀", &["尖沙咀", "tsim sha tsui"]),
    ("铜锣湾", &["铜锣湾", "causeway bay"]),
    ("时代广场", &["时代广场", "times square"]),
    ("曼哈顿", &["曼哈顿", "manhattan"]),
];

const BRANDS: &[(&str, &[&str])] = &[
    ("万豪", &["万豪", "marriott"]),
    ("希尔顿", &["希尔顿", "hilton"]),
    ("凯悦", &["凯悦", "hyatt"]),
    ("柏悦", &["柏悦", "park hyatt"]),
    ("洲际", &["洲际", "intercontinental", "ihg"]),
    ("香格里拉", &["香格里拉", "shangri-la", "shangri la"]),
    ("丽思卡尔顿", &["丽思卡尔顿", "丽思", "ritz-carlton", "ritz carlton"]),
    ("四季", &["四季酒店", "四季", "four seasons"]),
    ("喜来登", &["喜来登", "sheraton"]),
    ("威斯汀", &["威斯汀", "westin"]),
    ("文华东方", &["文华东方", "mandarin oriental"]),
    ("半岛", &["半岛酒店", "peninsula"]),
    ("安缦", &["安缦", "aman"]),
    ("瑰丽", &["瑰丽", "rosewood"]),
    ("宝格丽", &["宝格丽", "bulgari"]),
    ("索菲特", &["索菲特", "sofitel"]),
];

const SPECIAL_NEEDS: &[(&str, &[&str])] = &[
    ("家庭房", &["家庭房", "亲子房", "family room"]),
    ("连通房", &["连通房", "connecting room", "connecting rooms"]),
    ("无障碍", &["无障碍", "轮椅", "accessible", "wheelchair"]),
    ("可携带宠物", &["宠物", "pet", "pets", "pet-friendly"]),
    ("婴儿床", &["婴儿床", "crib", "cot"]),
    ("泳池", &["泳池", "游泳池", "pool"]),
    ("健身房", &["健身房", "gym", "fitness"]),
    ("停车位", &["停车", "parking"]),
    ("接机", &["接机", "airport pickup", "airport transfer"]),
];

const VIEWS: &[(&str, &[&str])] = &[
    ("海景", &["海景", "sea view", "ocean view"]),
    ("江景", &["江景", "river view"]),
    ("湖景", &["湖景", "lake view"]),
    ("山景", &["山景", "mountain view"]),
    ("富士山景", &["富士山景", "看富士山", "fuji view", "mount fuji view"]),
    ("城景", &["城景", "夜景", "city view", "skyline view"]),
    ("塔景", &["塔景", "铁塔", "tower view", "eiffel tower view"]),
];

const STYLES: &[(&str, &[&str])] = &[
    ("网红", &["网红", "instagrammable", "trendy"]),
    ("奢华", &["奢华", "豪华", "luxury", "luxurious"]),
    ("新开业", &["新开业", "新开", "newly opened", "new opening"]),
    ("精品设计", &["精品", "设计感", "boutique", "design hotel"]),
    ("商务", &["商务", "business hotel"]),
    ("温泉", &["温泉", "onsen", "ryokan"]),
    ("度假", &["度假风", "resort"]),
    ("经济实惠", &["性价比", "经济", "budget hotel", "affordable"]),
];

/// Stay dates as ISO text, either side optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StayDates {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
}

/// Head count read from one phrase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Headcount {
    pub adults: Option<i64>,
    pub children: Option<i64>,
}

/// Budget bounds before validation
pub type BudgetBounds = (Option<i64>, Option<i64>);

/// Candidates extracted from one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotUpdate {
    pub values: BTreeMap<SlotId, RawSlotValue>,
    /// Message expresses "no preference"
    pub skip: bool,
    /// Which rule produced each candidate
    pub matched_rules: Vec<(SlotId, &'static str)>,
}

impl SlotUpdate {
    pub fn get(&self, slot: SlotId) -> Option<&RawSlotValue> {
        self.values.get(&slot)
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.values.contains_key(&slot)
    }

    pub fn insert(&mut self, slot: SlotId, value: RawSlotValue, rule: &'static str) {
        self.values.insert(slot, value);
        self.matched_rules.push((slot, rule));
    }

    pub fn remove(&mut self, slot: SlotId) -> Option<RawSlotValue> {
        self.matched_rules.retain(|(s, _)| *s != slot);
        self.values.remove(&slot)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && !self.skip
    }

    /// Name of the rule that produced `slot`
    pub fn rule_for(&self, slot: SlotId) -> Option<&'static str> {
        self.matched_rules.iter().find(|(s, _)| *s == slot).map(|(_, r)| *r)
    }
}

/// Slot extractor for hotel conversations
pub struct SlotExtractor {
    /// City table used as a gazetteer before the city patterns
    cities: Option<Arc<dyn CityReference>>,
    city_rules: RuleSet<String>,
    date_rules: RuleSet<StayDates>,
    headcount_rules: RuleSet<Headcount>,
    room_rules: RuleSet<i64>,
    budget_rules: RuleSet<BudgetBounds>,
    star_rules: RuleSet<i64>,
    area_rules: RuleSet<String>,
    area_keywords: Gazetteer,
    brands: Gazetteer,
    special_needs: Gazetteer,
    views: Gazetteer,
    styles: Gazetteer,
    breakfast_rules: RuleSet<bool>,
}

impl Default for SlotExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotExtractor {
    /// Extractor without a city table; only the city patterns apply
    pub fn new() -> Self {
        Self {
            cities: None,
            city_rules: Self::build_city_rules(),
            date_rules: Self::build_date_rules(),
            headcount_rules: Self::build_headcount_rules(),
            room_rules: Self::build_room_rules(),
            budget_rules: Self::build_budget_rules(),
            star_rules: Self::build_star_rules(),
            area_rules: Self::build_area_rules(),
            area_keywords: Gazetteer::new(AREA_KEYWORDS),
            brands: Gazetteer::new(BRANDS),
            special_needs: Gazetteer::new(SPECIAL_NEEDS),
            views: Gazetteer::new(VIEWS),
            styles: Gazetteer::new(STYLES),
            breakfast_rules: Self::build_breakfast_rules(),
        }
    }

    pub fn with_city_reference(cities: Arc<dyn CityReference>) -> Self {
        Self {
            cities: Some(cities),
            ..Self::new()
        }
    }

    fn build_city_rules() -> RuleSet<String> {
        let c = CLAUSE_CHARS;
        RuleSet::new(vec![
            Rule::new(
                "recommend_city_hotels",
                90,
                Regex::new(&format!(r"推荐\s*((?:{c}){{2,20}}?)\s*的?\s*(?:酒店|住宿|宾馆)")).unwrap(),
                city_candidate,
            ),
            Rule::new(
                "hotels_in_city",
                85,
                Regex::new(
                    r"(?i)\b(?:hotels?|stay|staying|accommodation)\s+in\s+([a-z][a-z0-9 .'-]{1,30}?)(?:\s*(?:,|\.|!|\?|;|$)|\s+(?:for|from|on|with|and|near)\b)",
                )
                .unwrap(),
                city_candidate,
            ),
            Rule::new(
                "travel_to_city",
                80,
                Regex::new(&format!(r"去\s*((?:{c}){{2,20}}?)\s*(?:玩|住|旅游|旅行|出差|度假)")).unwrap(),
                city_candidate,
            ),
            Rule::new(
                "stay_in_city",
                75,
                Regex::new(&format!(r"在\s*((?:{c}){{2,20}}?)\s*(?:住|的酒店|酒店)")).unwrap(),
                city_candidate,
            ),
            Rule::new(
                "city_hotels",
                70,
                Regex::new(&format!(r"((?:{c}){{2,20}}?)\s*的?\s*(?:酒店|住宿)")).unwrap(),
                city_candidate,
            ),
        ])
    }

    fn build_date_rules() -> RuleSet<StayDates> {
        let n = NUMBER_PATTERN;
        let en_n = EN_NUMBER_PATTERN;
        let sep = RANGE_SEP;
        let iso = ISO_DATE;
        let zh = format!(r"{n}\s*月\s*{n}\s*[日号]?");
        let en = format!(
            r"(?:\b{m}\.?\s*\d{{1,2}}(?:st|nd|rd|th)?\b|\b\d{{1,2}}(?:st|nd|rd|th)?\s+(?:of\s+)?{m}\b)",
            m = EN_MONTH
        );
        let date = format!(r"(?:{iso}|{zh}|{en})");
        let rel = RELATIVE_DAY;

        // Order matters - ranges before single dates, absolute before relative
        RuleSet::new(vec![
            Rule::new(
                "iso_range",
                100,
                Regex::new(&format!(r"(?i)({iso})\s*{sep}\s*({iso})")).unwrap(),
                range_dates,
            ),
            Rule::new(
                "zh_month_day_range",
                90,
                Regex::new(&format!(r"({zh})\s*{sep}\s*({zh}|{n}\s*[日号])")).unwrap(),
                range_dates,
            ),
            Rule::new(
                "en_month_day_range",
                85,
                Regex::new(&format!(
                    r"(?i)({en})\s*{sep}\s*({en}|\d{{1,2}}(?:st|nd|rd|th)?\b)"
                ))
                .unwrap(),
                range_dates,
            ),
            Rule::new(
                "check_out_keyword",
                75,
                Regex::new(&format!(
                    r"(?i)(?:(?:入住|check[- ]?in)\D{{0,6}}?({date})\D{{0,8}}?)?(?:退房|离店|check[- ]?out)\D{{0,6}}?({date})"
                ))
                .unwrap(),
                keyword_dates,
            ),
            Rule::new(
                "date_with_nights",
                70,
                Regex::new(&format!(
                    r"(?i)({date})\D{{0,6}}?({n}|{en_n})\s*(?:晚|夜|nights?)"
                ))
                .unwrap(),
                date_with_nights,
            ),
            Rule::new("iso_single", 60, Regex::new(&format!(r"({iso})")).unwrap(), single_date),
            Rule::new(
                "month_day_single",
                55,
                Regex::new(&format!(r"(?i)({zh}|{en})")).unwrap(),
                single_date,
            ),
            Rule::new(
                "relative_with_nights",
                40,
                Regex::new(&format!(
                    r"(?i)({rel})\D{{0,6}}?({n}|{en_n})\s*(?:晚|夜|nights?)"
                ))
                .unwrap(),
                relative_with_nights,
            ),
            Rule::new(
                "relative_single",
                30,
                Regex::new(&format!(r"(?i)({rel})")).unwrap(),
                relative_single,
            ),
        ])
    }

    fn build_headcount_rules() -> RuleSet<Headcount> {
        let n = NUMBER_PATTERN;
        let en = EN_NUMBER_PATTERN;
        RuleSet::new(vec![
            Rule::new(
                "adults_children_short",
                100,
                Regex::new(&format!(r"({n})\s*大\s*({n})\s*小")).unwrap(),
                adults_and_children,
            ),
            Rule::new(
                "adults_children_zh",
                95,
                Regex::new(&format!(
                    r"({n})\s*(?:个|位|名)?\s*(?:成人|大人)\s*[,，、和加带及]?\s*({n})\s*(?:个|位|名)?\s*(?:孩子|小孩|儿童|小朋友)"
                ))
                .unwrap(),
                adults_and_children,
            ),
            Rule::new(
                "adults_children_en",
                95,
                Regex::new(&format!(
                    r"(?i)\b({en})\s*adults?\s*(?:,|and|&|\+|with|plus)?\s*({en})\s*(?:children|child|kids?)\b"
                ))
                .unwrap(),
                adults_and_children,
            ),
            Rule::new(
                "adults_zh",
                80,
                Regex::new(&format!(r"({n})\s*(?:个|位|名)?\s*(?:成人|大人)")).unwrap(),
                adults_only,
            ),
            Rule::new(
                "adults_en",
                80,
                Regex::new(&format!(r"(?i)\b({en})\s*adults?\b")).unwrap(),
                adults_only,
            ),
            Rule::new(
                "people_zh",
                60,
                Regex::new(&format!(r"({n})\s*(?:个人|位|人)(?:[^民]|$)")).unwrap(),
                adults_only,
            ),
            Rule::new(
                "people_en",
                60,
                Regex::new(&format!(
                    r"(?i)\b({en})\s*(?:people|persons|guests|pax|of us)\b"
                ))
                .unwrap(),
                adults_only,
            ),
            Rule::new(
                "children_zh",
                40,
                Regex::new(&format!(r"({n})\s*(?:个|位|名)?\s*(?:孩子|小孩|儿童|小朋友)")).unwrap(),
                children_only,
            ),
            Rule::new(
                "children_en",
                40,
                Regex::new(&format!(r"(?i)\b({en})\s*(?:children|child|kids?)\b")).unwrap(),
                children_only,
            ),
        ])
    }

    fn build_room_rules() -> RuleSet<i64> {
        let n = NUMBER_PATTERN;
        let en = EN_NUMBER_PATTERN;
        RuleSet::new(vec![
            Rule::new(
                "rooms_zh",
                90,
                Regex::new(&format!(r"({n})\s*间(?:房|客房|房间)?")).unwrap(),
                first_number,
            ),
            Rule::new(
                "rooms_en",
                85,
                Regex::new(&format!(r"(?i)\b({en})\s*rooms?\b")).unwrap(),
                first_number,
            ),
            Rule::new(
                "rooms_zh_alt",
                80,
                Regex::new(&format!(r"({n})\s*个?房间")).unwrap(),
                first_number,
            ),
        ])
    }

    fn build_budget_rules() -> RuleSet<BudgetBounds> {
        let amt = AMOUNT;
        let sep = r"(?:-|~|到|至|to)";
        let pre = CURRENCY_PREFIX;
        let suf = CURRENCY_SUFFIX;
        RuleSet::new(vec![
            Rule::new(
                "budget_keyword_range",
                100,
                Regex::new(&format!(
                    r"(?i)(?:预算|budget)\D{{0,6}}?{amt}\s*{sep}\s*{pre}?\s*{amt}"
                ))
                .unwrap(),
                budget_range,
            ),
            Rule::new(
                "currency_suffix_range",
                90,
                Regex::new(&format!(r"(?i){amt}\s*{sep}\s*{amt}\s*{suf}")).unwrap(),
                budget_range,
            ),
            Rule::new(
                "currency_prefix_range",
                88,
                Regex::new(&format!(r"(?i){pre}\s*{amt}\s*{sep}\s*{pre}?\s*{amt}")).unwrap(),
                budget_range,
            ),
            Rule::new(
                "multiplier_range",
                82,
                Regex::new(&format!(
                    r"(?i)(\d+(?:\.\d+)?)\s*(k\b|千|万|w\b)?\s*{sep}\s*(\d+(?:\.\d+)?)\s*(k\b|千|万|w\b)"
                ))
                .unwrap(),
                budget_range,
            ),
            Rule::new(
                "bare_range",
                80,
                Regex::new(&format!(r"(\d{{3,}})()\s*{sep}\s*(\d{{3,}})()")).unwrap(),
                budget_range,
            ),
            Rule::new(
                "around_amount",
                70,
                Regex::new(&format!(
                    r"(?i)(?:大概|大约|约|around|about|approximately|roughly)\s*{pre}?\s*{amt}"
                ))
                .unwrap(),
                budget_around,
            ),
            Rule::new(
                "amount_around",
                70,
                Regex::new(&format!(r"(?i){amt}\s*{suf}?\s*(?:左右|上下)")).unwrap(),
                budget_around,
            ),
            Rule::new(
                "up_to_amount",
                65,
                Regex::new(&format!(
                    r"(?i)(?:不超过|不高于|最多|最高|低于|under|below|less than|up to|no more than|max(?:imum)?)\s*{pre}?\s*{amt}"
                ))
                .unwrap(),
                budget_up_to,
            ),
            Rule::new(
                "amount_within",
                65,
                Regex::new(&format!(r"(?i){amt}\s*{suf}?\s*(?:以内|以下|之内)")).unwrap(),
                budget_up_to,
            ),
            Rule::new(
                "at_least_amount",
                60,
                Regex::new(&format!(
                    r"(?i)(?:至少|最低|不低于|at least|over|above|more than|min(?:imum)?)\s*{pre}?\s*{amt}"
                ))
                .unwrap(),
                budget_at_least,
            ),
            Rule::new(
                "amount_above",
                60,
                Regex::new(&format!(r"(?i){amt}\s*{suf}?\s*以上")).unwrap(),
                budget_at_least,
            ),
            Rule::new(
                "per_night_amount",
                55,
                Regex::new(&format!(
                    r"(?i)(?:每晚|一晚|per night)\s*{pre}?\s*{amt}|{amt}\s*{suf}?\s*(?:/晚|每晚|一晚|per night|a night|/night)"
                ))
                .unwrap(),
                budget_per_night,
            ),
            Rule::new(
                "budget_single",
                50,
                Regex::new(&format!(r"(?i)(?:预算|budget)\D{{0,6}}?{amt}")).unwrap(),
                budget_up_to,
            ),
        ])
    }

    fn build_star_rules() -> RuleSet<i64> {
        let n = NUMBER_PATTERN;
        RuleSet::new(vec![
            Rule::new("stars_zh", 90, Regex::new(&format!(r"({n})\s*星级?")).unwrap(), first_number),
            Rule::new(
                "stars_en",
                85,
                Regex::new(r"(?i)\b(\d|three|four|five)\s*[- ]?\s*stars?\b").unwrap(),
                first_number,
            ),
            Rule::new("stars_symbol", 80, Regex::new(r"([3-5])\s*[*★]").unwrap(), first_number),
        ])
    }

    fn build_area_rules() -> RuleSet<String> {
        let c = CLAUSE_CHARS;
        RuleSet::new(vec![
            Rule::new(
                "near_zh",
                100,
                Regex::new(&format!(
                    r"靠近\s*((?:{c}){{1,12}}?)(?:的|附近|周边|一带|地区|[\s,，。！？!?、;；]|$)"
                ))
                .unwrap(),
                area_candidate,
            ),
            Rule::new(
                "around_zh",
                90,
                Regex::new(&format!(r"((?:{c}){{1,12}}?)(?:附近|周边|一带)")).unwrap(),
                area_candidate,
            ),
            Rule::new(
                "near_en",
                85,
                Regex::new(
                    r"(?i)\b(?:near|close to|next to|around)\s+(?:the\s+)?([a-z][a-z0-9 .'-]{1,30}?)(?:\s*(?:,|\.|!|\?|;|$)|\s+(?:and|with|for|please)\b)",
                )
                .unwrap(),
                area_candidate,
            ),
        ])
    }

    fn build_breakfast_rules() -> RuleSet<bool> {
        // Negative phrases first: "不要早餐" contains "要早餐"
        RuleSet::new(vec![
            Rule::new(
                "breakfast_declined",
                100,
                Regex::new(
                    r"(?i)(?:不需要|不用|不要|无需|没有)\s*早(?:餐|饭)|不(?:含|带|包)早|早(?:餐|饭)\s*(?:就|也|都)?\s*(?:不用|不要|不需要|算了|免了)|no breakfast|without breakfast|room only|skip breakfast",
                )
                .unwrap(),
                |_, _| Some(false),
            ),
            Rule::new(
                "breakfast_wanted",
                90,
                Regex::new(
                    r"(?i)(?:需要|要|含|包|带)\s*早(?:餐|饭)|(?:含|包|带)早(?:[^点上晨起]|$)|with breakfast|breakfast included|include breakfast|including breakfast",
                )
                .unwrap(),
                |_, _| Some(true),
            ),
            Rule::new(
                "breakfast_mentioned",
                50,
                Regex::new(r"(?i)早餐|早饭|breakfast").unwrap(),
                |_, _| Some(true),
            ),
        ])
    }

    /// Extract candidates relative to today's UTC date
    pub fn extract(&self, message: &str) -> SlotUpdate {
        self.extract_at(message, Utc::now().date_naive())
    }

    /// Extract candidates, resolving year-less and relative dates against `today`
    pub fn extract_at(&self, message: &str, today: NaiveDate) -> SlotUpdate {
        let text = normalize_message(message);
        let ctx = RuleContext { today };
        let mut update = SlotUpdate::default();
        if text.is_empty() {
            return update;
        }

        if let Some((rule, city)) = self.extract_city(&text, &ctx) {
            update.insert(SlotId::City, RawSlotValue::Text(city), rule);
        }

        if let Some((rule, dates)) = self.date_rules.first_match(&text, &ctx) {
            if let Some(check_in) = dates.check_in {
                update.insert(SlotId::CheckIn, RawSlotValue::Date(check_in), rule);
            }
            if let Some(check_out) = dates.check_out {
                update.insert(SlotId::CheckOut, RawSlotValue::Date(check_out), rule);
            }
        }

        let headcount = self.headcount_rules.first_match(&text, &ctx);
        let rooms = self.room_rules.first_match(&text, &ctx);
        if headcount.is_some() || rooms.is_some() {
            let rule = headcount.map(|(r, _)| r).or(rooms.map(|(r, _)| r)).unwrap_or("party");
            let counts = headcount.map(|(_, h)| h).unwrap_or_default();
            update.insert(
                SlotId::Party,
                RawSlotValue::Party {
                    adults: counts.adults,
                    children: counts.children,
                    rooms: rooms.map(|(_, n)| n),
                },
                rule,
            );
        }

        if let Some((rule, (min, max))) = self.budget_rules.first_match(&text, &ctx) {
            update.insert(SlotId::BudgetRangeLocal, RawSlotValue::Range { min, max }, rule);
        }

        if let Some((rule, stars)) = self.star_rules.first_match(&text, &ctx) {
            update.insert(SlotId::StarLevel, RawSlotValue::Integer(stars), rule);
        }

        let area = self
            .area_rules
            .first_match(&text, &ctx)
            .or_else(|| self.area_keywords.first(&text).map(|a| ("area_keyword", a.to_string())));
        if let Some((rule, area)) = area {
            update.insert(SlotId::PreferredArea, RawSlotValue::Text(area), rule);
        }

        let brands = self.brands.collect(&text);
        if !brands.is_empty() {
            let brands = brands.into_iter().map(str::to_string).collect();
            update.insert(SlotId::PreferredBrands, RawSlotValue::Set(brands), "brand_keyword");
        }

        let needs = self.special_needs.collect(&text);
        if !needs.is_empty() {
            let needs = needs.into_iter().map(str::to_string).collect();
            update.insert(SlotId::SpecialNeeds, RawSlotValue::Set(needs), "special_need_keyword");
        }

        if let Some(view) = self.views.first(&text) {
            update.insert(SlotId::View, RawSlotValue::Text(view.to_string()), "view_keyword");
        }

        if let Some(style) = self.styles.first(&text) {
            update.insert(SlotId::Style, RawSlotValue::Text(style.to_string()), "style_keyword");
        }

        if let Some((rule, wanted)) = self.breakfast_rules.first_match(&text, &ctx) {
            update.insert(SlotId::BreakfastNeeded, RawSlotValue::Flag(wanted), rule);
        }

        update.skip = SKIP_PATTERN.is_match(&text);

        tracing::debug!(
            candidates = update.values.len(),
            rules = ?update.matched_rules,
            skip = update.skip,
            "Extracted slot candidates"
        );
        update
    }

    /// City from the reference table, then from phrasing patterns
    fn extract_city(&self, text: &str, ctx: &RuleContext) -> Option<(&'static str, String)> {
        if let Some(record) = self.cities.as_ref().and_then(|c| c.find_in_text(text)) {
            return Some(("city_gazetteer", record.name.clone()));
        }

        let (rule, candidate) = self.city_rules.first_match(text, ctx)?;
        let canonical = self
            .cities
            .as_ref()
            .and_then(|c| c.lookup(&candidate))
            .map(|record| record.name.clone())
            .unwrap_or(candidate);
        Some((rule, canonical))
    }

    /// Read a whole short reply as a city name, for answers to "which city?"
    pub fn city_from_bare_reply(&self, message: &str) -> Option<String> {
        let text = normalize_message(message);
        let trimmed = text
            .trim_matches(|c: char| c.is_ascii_punctuation() || "，。！？、".contains(c))
            .trim();
        let trimmed = ["我想去", "想去", "我去", "去", "在", "to ", "in "]
            .iter()
            .find_map(|p| trimmed.strip_prefix(p))
            .unwrap_or(trimmed)
            .trim();

        if trimmed.chars().count() > 20 || trimmed.split_whitespace().count() > 3 {
            return None;
        }
        if let Some(record) = self.cities.as_ref().and_then(|c| c.lookup(trimmed)) {
            return Some(record.name.clone());
        }
        if NOT_A_PLACE.is_match(trimmed) || SKIP_PATTERN.is_match(trimmed) {
            return None;
        }
        clean_city(trimmed)
    }

    #[cfg(test)]
    pub(crate) fn date_rule_names(&self) -> Vec<&'static str> {
        self.date_rules.names()
    }

    #[cfg(test)]
    pub(crate) fn date_rule_specificities(&self) -> Vec<u8> {
        self.date_rules.specificities()
    }
}

// =============================================================================
// Candidate helpers
// =============================================================================

fn clean_city(raw: &str) -> Option<String> {
    let city = raw.trim().trim_end_matches('的').trim();
    if city.is_empty() || CITY_STOP_FRAGMENTS.iter().any(|stop| city.contains(stop)) {
        return None;
    }
    if !city.chars().any(char::is_alphabetic) {
        return None;
    }
    Some(city.to_string())
}

fn city_candidate(caps: &Captures<'_>, _: &RuleContext) -> Option<String> {
    clean_city(caps.get(1)?.as_str())
}

fn area_candidate(caps: &Captures<'_>, _: &RuleContext) -> Option<String> {
    let mut area = caps.get(1)?.as_str().trim();
    while let Some(rest) = AREA_PREFIXES.iter().find_map(|p| area.strip_prefix(p)) {
        area = rest.trim();
    }
    let area = area.trim_end_matches('的').trim();
    if area.is_empty() {
        return None;
    }
    Some(area.to_string())
}

fn first_number(caps: &Captures<'_>, _: &RuleContext) -> Option<i64> {
    parse_number(caps.get(1)?.as_str())
}

fn adults_and_children(caps: &Captures<'_>, _: &RuleContext) -> Option<Headcount> {
    Some(Headcount {
        adults: Some(parse_number(caps.get(1)?.as_str())?),
        children: Some(parse_number(caps.get(2)?.as_str())?),
    })
}

fn adults_only(caps: &Captures<'_>, _: &RuleContext) -> Option<Headcount> {
    Some(Headcount {
        adults: Some(parse_number(caps.get(1)?.as_str())?),
        children: None,
    })
}

fn children_only(caps: &Captures<'_>, _: &RuleContext) -> Option<Headcount> {
    Some(Headcount {
        adults: None,
        children: Some(parse_number(caps.get(1)?.as_str())?),
    })
}

// =============================================================================
// Dates
// =============================================================================

enum DatePart {
    /// Explicit year; kept as text so an impossible date reaches the schema
    Full(String),
    MonthDay(u32, u32),
    Day(u32),
}

fn to_u32(token: &str) -> Option<u32> {
    parse_number(token).and_then(|n| u32::try_from(n).ok())
}

fn parse_part(fragment: &str) -> Option<DatePart> {
    let fragment = fragment.trim();
    if ISO_PART.is_match(fragment) {
        let normalized = parse_ymd(fragment)
            .map(to_iso)
            .unwrap_or_else(|| fragment.replace(['/', '.'], "-"));
        return Some(DatePart::Full(normalized));
    }
    if let Some(caps) = ZH_PART.captures(fragment) {
        return Some(DatePart::MonthDay(to_u32(&caps[1])?, to_u32(&caps[2])?));
    }
    if let Some(caps) = EN_MONTH_PART.captures(fragment) {
        let month = month_from_english(&caps[1])?;
        let day = to_u32(DIGITS.find(fragment)?.as_str())?;
        return Some(DatePart::MonthDay(month, day));
    }
    if let Some(caps) = DAY_PART.captures(fragment) {
        return Some(DatePart::Day(to_u32(&caps[1])?));
    }
    if let Some(m) = DIGITS.find(fragment) {
        return Some(DatePart::Day(to_u32(m.as_str())?));
    }
    None
}

fn resolve_start(part: &DatePart, today: NaiveDate) -> Option<String> {
    match part {
        DatePart::Full(text) => Some(text.clone()),
        DatePart::MonthDay(month, day) => resolve_month_day(*month, *day, today).map(to_iso),
        DatePart::Day(_) => None,
    }
}

fn resolve_finish(part: &DatePart, start: Option<NaiveDate>, today: NaiveDate) -> Option<String> {
    use chrono::Datelike;
    match (part, start) {
        (DatePart::Full(text), _) => Some(text.clone()),
        (DatePart::MonthDay(month, day), Some(start)) => {
            resolve_end(start, *month, *day).map(to_iso)
        }
        (DatePart::MonthDay(month, day), None) => {
            resolve_month_day(*month, *day, today).map(to_iso)
        }
        (DatePart::Day(day), Some(start)) => resolve_end(start, start.month(), *day).map(to_iso),
        (DatePart::Day(_), None) => None,
    }
}

fn range_dates(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let start = parse_part(caps.get(1)?.as_str())?;
    let end = parse_part(caps.get(2)?.as_str())?;
    let check_in = resolve_start(&start, ctx.today)?;
    let check_out = resolve_finish(&end, parse_ymd(&check_in), ctx.today)?;
    Some(StayDates {
        check_in: Some(check_in),
        check_out: Some(check_out),
    })
}

fn keyword_dates(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let check_in = caps
        .get(1)
        .and_then(|m| parse_part(m.as_str()))
        .and_then(|part| resolve_start(&part, ctx.today));
    let end = parse_part(caps.get(2)?.as_str())?;
    let check_out = resolve_finish(&end, check_in.as_deref().and_then(parse_ymd), ctx.today)?;
    Some(StayDates {
        check_in,
        check_out: Some(check_out),
    })
}

fn nights_after(start: Option<NaiveDate>, token: &str) -> Option<String> {
    let nights = parse_number(token).filter(|n| (1..=MAX_NIGHTS).contains(n))?;
    add_nights(start?, nights).map(to_iso)
}

fn date_with_nights(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let start = parse_part(caps.get(1)?.as_str())?;
    let check_in = resolve_start(&start, ctx.today)?;
    let check_out = nights_after(parse_ymd(&check_in), caps.get(2)?.as_str());
    Some(StayDates {
        check_in: Some(check_in),
        check_out,
    })
}

fn single_date(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let part = parse_part(caps.get(1)?.as_str())?;
    Some(StayDates {
        check_in: Some(resolve_start(&part, ctx.today)?),
        check_out: None,
    })
}

fn relative_start(caps: &Captures<'_>, ctx: &RuleContext) -> Option<NaiveDate> {
    let offset = relative_day_offset(caps.get(1)?.as_str())?;
    add_nights(ctx.today, offset)
}

fn relative_with_nights(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let start = relative_start(caps, ctx)?;
    let check_out = nights_after(Some(start), caps.get(2)?.as_str());
    Some(StayDates {
        check_in: Some(to_iso(start)),
        check_out,
    })
}

fn relative_single(caps: &Captures<'_>, ctx: &RuleContext) -> Option<StayDates> {
    let start = relative_start(caps, ctx)?;
    Some(StayDates {
        check_in: Some(to_iso(start)),
        check_out: None,
    })
}

// =============================================================================
// Budget
// =============================================================================

fn amount(
    number: Option<regex::Match<'_>>,
    unit: Option<regex::Match<'_>>,
) -> Option<(f64, Option<f64>)> {
    let text = number?.as_str();
    let base = match text.parse::<f64>() {
        Ok(value) => value,
        Err(_) => parse_number(text)? as f64,
    };
    let multiplier = unit.and_then(|u| match u.as_str().to_lowercase().as_str() {
        "k" | "千" => Some(1_000.0),
        "万" | "w" => Some(10_000.0),
        _ => None,
    });
    Some((base, multiplier))
}

fn plausible(value: f64) -> Option<i64> {
    let value = value.round() as i64;
    (value >= MIN_PLAUSIBLE_BUDGET).then_some(value)
}

fn budget_range(caps: &Captures<'_>, _: &RuleContext) -> Option<BudgetBounds> {
    let (low, low_unit) = amount(caps.get(1), caps.get(2))?;
    let (high, high_unit) = amount(caps.get(3), caps.get(4))?;
    // "1-2千" shares the trailing multiplier
    let low_unit = match (low_unit, high_unit) {
        (None, Some(unit)) if low <= high => Some(unit),
        _ => low_unit,
    };
    let low = plausible(low * low_unit.unwrap_or(1.0))?;
    let high = plausible(high * high_unit.unwrap_or(1.0))?;
    Some((Some(low), Some(high)))
}

fn single_amount(caps: &Captures<'_>) -> Option<i64> {
    let (number, unit) = if caps.get(1).is_some() { (1, 2) } else { (3, 4) };
    let (value, multiplier) = amount(caps.get(number), caps.get(unit))?;
    plausible(value * multiplier.unwrap_or(1.0))
}

fn budget_around(caps: &Captures<'_>, _: &RuleContext) -> Option<BudgetBounds> {
    let value = single_amount(caps)?;
    Some((Some(value), Some(value)))
}

fn budget_up_to(caps: &Captures<'_>, _: &RuleContext) -> Option<BudgetBounds> {
    Some((None, Some(single_amount(caps)?)))
}

fn budget_at_least(caps: &Captures<'_>, _: &RuleContext) -> Option<BudgetBounds> {
    Some((Some(single_amount(caps)?), None))
}

fn budget_per_night(caps: &Captures<'_>, ctx: &RuleContext) -> Option<BudgetBounds> {
    budget_around(caps, ctx)
}
