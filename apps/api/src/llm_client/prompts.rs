// Prompt constants for the content tasks. User-facing text is Korean.

/// System turn for image extraction. The model must answer with a JSON object.
pub const OCR_SYSTEM: &str = "당신은 이미지를 JSON으로 정확하게 추출하는 도우미입니다.";

/// Used when an OCR request carries no prompt of its own.
pub const OCR_DEFAULT_INSTRUCTION: &str = "이 이미지를 보고 1순위(첫 번째) 업체 정보를 JSON으로 출력하세요. \
    필드: company, bizno, ceo, contact, amount, reason, period, address.";

/// System turn for notice body drafting.
pub const BODY_WRITER_SYSTEM: &str = "당신은 아파트 공지문 본문을 작성하는 도우미입니다.";
