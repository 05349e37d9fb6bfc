mod dataloader;
mod mnist;
mod transforms;
