//! Image-bearing SOP classes.

use dicom::dictionary_std::uids::*;

/// SOP classes whose instances carry viewable pixel data.
pub static IMAGE_SOP_CLASSES: &[&str] = &[
    COMPUTED_RADIOGRAPHY_IMAGE_STORAGE,
    DIGITAL_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION,
    DIGITAL_X_RAY_IMAGE_STORAGE_FOR_PROCESSING,
    DIGITAL_MAMMOGRAPHY_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION,
    DIGITAL_MAMMOGRAPHY_X_RAY_IMAGE_STORAGE_FOR_PROCESSING,
    DIGITAL_INTRA_ORAL_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION,
    DIGITAL_INTRA_ORAL_X_RAY_IMAGE_STORAGE_FOR_PROCESSING,
    CT_IMAGE_STORAGE,
    ENHANCED_CT_IMAGE_STORAGE,
    LEGACY_CONVERTED_ENHANCED_CT_IMAGE_STORAGE,
    ULTRASOUND_MULTI_FRAME_IMAGE_STORAGE,
    MR_IMAGE_STORAGE,
    ENHANCED_MR_IMAGE_STORAGE,
    ENHANCED_MR_COLOR_IMAGE_STORAGE,
    LEGACY_CONVERTED_ENHANCED_MR_IMAGE_STORAGE,
    ULTRASOUND_IMAGE_STORAGE,
    SECONDARY_CAPTURE_IMAGE_STORAGE,
    MULTI_FRAME_SINGLE_BIT_SECONDARY_CAPTURE_IMAGE_STORAGE,
    MULTI_FRAME_GRAYSCALE_BYTE_SECONDARY_CAPTURE_IMAGE_STORAGE,
    MULTI_FRAME_GRAYSCALE_WORD_SECONDARY_CAPTURE_IMAGE_STORAGE,
    MULTI_FRAME_TRUE_COLOR_SECONDARY_CAPTURE_IMAGE_STORAGE,
    X_RAY_ANGIOGRAPHIC_IMAGE_STORAGE,
    ENHANCED_XA_IMAGE_STORAGE,
    X_RAY_RADIOFLUOROSCOPIC_IMAGE_STORAGE,
    ENHANCED_XRF_IMAGE_STORAGE,
    X_RAY3_D_ANGIOGRAPHIC_IMAGE_STORAGE,
    X_RAY3_D_CRANIOFACIAL_IMAGE_STORAGE,
    BREAST_TOMOSYNTHESIS_IMAGE_STORAGE,
    BREAST_PROJECTION_X_RAY_IMAGE_STORAGE_FOR_PRESENTATION,
    BREAST_PROJECTION_X_RAY_IMAGE_STORAGE_FOR_PROCESSING,
    INTRAVASCULAR_OPTICAL_COHERENCE_TOMOGRAPHY_IMAGE_STORAGE_FOR_PRESENTATION,
    INTRAVASCULAR_OPTICAL_COHERENCE_TOMOGRAPHY_IMAGE_STORAGE_FOR_PROCESSING,
    NUCLEAR_MEDICINE_IMAGE_STORAGE,
    VL_ENDOSCOPIC_IMAGE_STORAGE,
    VIDEO_ENDOSCOPIC_IMAGE_STORAGE,
    VL_MICROSCOPIC_IMAGE_STORAGE,
    VIDEO_MICROSCOPIC_IMAGE_STORAGE,
    VL_SLIDE_COORDINATES_MICROSCOPIC_IMAGE_STORAGE,
    VL_PHOTOGRAPHIC_IMAGE_STORAGE,
    VIDEO_PHOTOGRAPHIC_IMAGE_STORAGE,
    OPHTHALMIC_PHOTOGRAPHY8_BIT_IMAGE_STORAGE,
    OPHTHALMIC_PHOTOGRAPHY16_BIT_IMAGE_STORAGE,
    OPHTHALMIC_TOMOGRAPHY_IMAGE_STORAGE,
    VL_WHOLE_SLIDE_MICROSCOPY_IMAGE_STORAGE,
    POSITRON_EMISSION_TOMOGRAPHY_IMAGE_STORAGE,
    ENHANCED_PET_IMAGE_STORAGE,
    LEGACY_CONVERTED_ENHANCED_PET_IMAGE_STORAGE,
    RT_IMAGE_STORAGE,
];

/// Whether the SOP class identifies viewable pixel data.
///
/// Unknown UIDs are not images. Trailing padding from the encoded UID
/// value is ignored.
pub fn is_image(sop_class_uid: &str) -> bool {
    let uid = sop_class_uid.trim_end_matches(['\0', ' ']);
    IMAGE_SOP_CLASSES.contains(&uid)
}

#[cfg(test)]
mod tests {
    use super::is_image;
    use dicom::dictionary_std::uids;

    #[test]
    fn radiography_and_cross_sectional_classes_are_images() {
        assert!(is_image(uids::COMPUTED_RADIOGRAPHY_IMAGE_STORAGE));
        assert!(is_image(uids::DIGITAL_X_RAY_IMAGE_STORAGE_FOR_PROCESSING));
        assert!(is_image(uids::CT_IMAGE_STORAGE));
        assert!(is_image(uids::ENHANCED_MR_IMAGE_STORAGE));
        assert!(is_image(uids::RT_IMAGE_STORAGE));
        assert!(is_image("1.2.840.10008.5.1.4.1.1.128"));
    }

    #[test]
    fn padded_uid_is_still_recognized() {
        assert!(is_image("1.2.840.10008.5.1.4.1.1.2\0"));
    }

    #[test]
    fn documents_and_unknown_classes_are_not_images() {
        assert!(!is_image(uids::ENCAPSULATED_PDF_STORAGE));
        assert!(!is_image(uids::COMPREHENSIVE_SR_STORAGE));
        assert!(!is_image(uids::RT_STRUCTURE_SET_STORAGE));
        assert!(!is_image(uids::GRAYSCALE_SOFTCOPY_PRESENTATION_STATE_STORAGE));
        assert!(!is_image("1.2.3.4"));
        assert!(!is_image(""));
    }
}
