//! Built-in sample library.
//!
//! The store starts from this single document; its raw text is the OCR
//! output of the SOHACO product-analysis deck.

use chrono::Utc;

use crate::models::{Document, DocumentType, ExtractedMetadata};

/// Id of the built-in sample document.
pub const SAMPLE_DOCUMENT_ID: &str = "doc_sohaco_analysis";

/// Full OCR text of the sample document.
pub const SAMPLE_OCR_CONTENT: &str = include_str!("sample_ocr.txt");

fn strings(items: &[&str]) -> Option<Vec<String>> {
    Some(items.iter().map(|s| s.to_string()).collect())
}

/// Documents the library is seeded with.
pub fn initial_documents() -> Vec<Document> {
    let metadata = ExtractedMetadata {
        title: "Đánh giá & Phân tích Sản phẩm Prospan® (SOHACO)".to_string(),
        summary: "Tài liệu phân tích toàn diện khẳng định vị thế số 1 của Prospan. Tổng hợp dữ liệu từ 18 nghiên cứu lâm sàng trên 65.000 bệnh nhân. So sánh chi tiết lợi thế của dịch chiết EA 575 (thuốc gốc, 4 tác động, không cồn/đường) so với các thuốc long đờm hóa dược (ACC, Ambroxol) và các sản phẩm thảo dược/xách tay khác.".to_string(),
        publication_date: Some("2024".to_string()),
        ingredients: strings(&["Cao khô lá thường xuân", "Dịch chiết độc quyền EA 575®"]),
        mechanism: Some("4 tác động: Tiêu đờm, Chống viêm, Giảm ho, Giãn phế quản".to_string()),
        indications: strings(&[
            "Ho cấp tính",
            "Viêm phế quản cấp",
            "Viêm phế quản mãn tính",
            "Hen phế quản (điều trị bổ sung)",
        ]),
        contraindications: strings(&[
            "Không có chống chỉ định đặc biệt (lưu ý thành phần sorbitol gây nhuận tràng nhẹ)",
        ]),
        population: Some("Mọi lứa tuổi: Trẻ sơ sinh, trẻ em, người lớn, người già".to_string()),
        dosage: Some("Tham khảo tờ hướng dẫn sử dụng (Syrup/Forte)".to_string()),
        results: strings(&[
            "Giảm ho hiệu quả trong 48 giờ (Schaefer 2016)",
            "Tỷ lệ tác dụng phụ cực thấp 0,22% trên 52.478 trẻ em",
            "Cải thiện chức năng phổi tốt hơn Acetylcystein và Ambroxol",
            "Là thuốc ho thảo dược duy nhất tại VN có NCLS chứng minh hiệu quả & an toàn",
        ]),
        source: Some("SOHACO Group - Đào tạo nội bộ".to_string()),
    };

    vec![Document::ready(
        SAMPLE_DOCUMENT_ID,
        "SOHACO_Prospan_Product_Analysis.pdf",
        DocumentType::Marketing,
        Utc::now(),
        SAMPLE_OCR_CONTENT,
        metadata,
    )]
}
