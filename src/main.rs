//! Groups the instances of DICOM files into display sets
//! and prints them per patient and study.

fn main() {
    std::process::exit(dicom_stacker::app::run());
}
