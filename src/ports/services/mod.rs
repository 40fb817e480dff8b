mod file_grabber;

pub use file_grabber::FileGrabber;
