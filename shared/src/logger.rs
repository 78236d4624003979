use core::any::Any;

/// Sink for the flight log. Every message sent over the link is also written
/// here, one data point per message.
pub trait DataPointLogger<T: ?Sized> {
    fn log_data_point(&mut self, data_point: &T);
    fn get_bytes_logged(&self) -> u32;
    fn set_logging_enabled(&mut self, enabled: bool);

    fn as_mut_any(&mut self) -> &mut dyn Any;
}
